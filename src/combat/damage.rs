//! Damage resolution for the Solstora greatsword
//!
//! A hit deals 2d6 slashing plus 1d6 lightning. On top of that:
//! - Critical hits double every damage die, not flat bonuses
//! - Great Weapon Fighting treats slashing dice showing 1 or 2 as 3
//! - Savage Attacker rolls the slashing dice twice and keeps the better set
//! - Great Weapon Master adds the proficiency bonus once
//! - Graze (Weapon Mastery) deals the attack modifier as slashing on a miss

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dice::join_rolls;
use super::rng::DieSource;
use super::weapon::WeaponState;

/// Sides on every Solstora damage die
pub const DAMAGE_DIE_SIDES: u32 = 6;

/// Slashing dice on a normal hit
pub const SLASHING_DICE: u32 = 2;

/// Lightning dice on a normal hit
pub const LIGHTNING_DICE: u32 = 1;

/// Great Weapon Fighting raises any die at or below this value
pub const GREAT_WEAPON_FIGHTING_FLOOR: u32 = 3;

/// Damage types dealt by the weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    /// Blade damage, scaled by strength and feats
    Slashing,
    /// Enchantment damage, dice only
    Lightning,
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DamageType::Slashing => "Slashing",
            DamageType::Lightning => "Lightning",
        };
        write!(f, "{}", s)
    }
}

/// Kind of damage roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageMode {
    #[default]
    Normal,
    /// Natural 20: dice are doubled
    Critical,
    /// Miss with Weapon Mastery: modifier only, no dice
    Graze,
}

impl DamageMode {
    /// Factor applied to every damage die count
    pub fn dice_multiplier(&self) -> u32 {
        match self {
            DamageMode::Critical => 2,
            _ => 1,
        }
    }
}

impl FromStr for DamageMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(DamageMode::Normal),
            "critical" | "crit" => Ok(DamageMode::Critical),
            "graze" => Ok(DamageMode::Graze),
            _ => Err(()),
        }
    }
}

/// One damage die: what it showed and what it counts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DieResult {
    pub rolled: u32,
    pub value: u32,
}

impl DieResult {
    /// Whether Great Weapon Fighting changed this die
    pub fn raised(&self) -> bool {
        self.value != self.rolled
    }

    fn describe(&self) -> String {
        if self.raised() {
            format!(
                "{} (1d{}: rolled {} → {} from Great Weapon Fighting)",
                self.value, DAMAGE_DIE_SIDES, self.rolled, self.value
            )
        } else {
            format!("{} (1d{})", self.value, DAMAGE_DIE_SIDES)
        }
    }
}

/// A set of slashing dice after Great Weapon Fighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceSet {
    pub dice: Vec<DieResult>,
    pub total: i32,
}

impl DiceSet {
    fn describe(&self) -> String {
        self.dice
            .iter()
            .map(DieResult::describe)
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Both Savage Attacker sets and which one was kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavageAttackerRoll {
    pub sets: [DiceSet; 2],
    /// 1 or 2
    pub chosen: u8,
}

impl SavageAttackerRoll {
    /// The set whose total counts
    pub fn kept(&self) -> &DiceSet {
        &self.sets[usize::from(self.chosen.saturating_sub(1)).min(1)]
    }
}

/// Result of a damage roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageOutcome {
    pub mode: DamageMode,
    /// False when a precondition was missing and nothing was rolled
    pub rolled: bool,
    pub slashing_total: i32,
    pub lightning_total: i32,
    pub grand_total: i32,
    /// Slashing dice that counted
    pub slashing_dice: Vec<DieResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savage_attacker: Option<SavageAttackerRoll>,
    pub lightning_dice: Vec<u32>,
    pub narrative: String,
}

impl DamageOutcome {
    /// Non-fatal outcome explaining why nothing was rolled
    fn guidance(mode: DamageMode, message: &str) -> Self {
        Self {
            mode,
            rolled: false,
            slashing_total: 0,
            lightning_total: 0,
            grand_total: 0,
            slashing_dice: Vec::new(),
            savage_attacker: None,
            lightning_dice: Vec::new(),
            narrative: message.to_string(),
        }
    }

    /// Text for the roll history: header and totals first, breakdown after
    ///
    /// Guidance outcomes are returned unchanged.
    pub fn history_text(&self) -> String {
        if !self.rolled {
            return self.narrative.clone();
        }

        let (header, breakdown) = self
            .narrative
            .split_once('\n')
            .unwrap_or((self.narrative.as_str(), ""));
        let first = format!(
            "{} {}",
            header,
            totals(self.slashing_total, self.lightning_total, self.grand_total)
        );

        if breakdown.is_empty() {
            first
        } else {
            format!("{}\n{}", first, breakdown)
        }
    }
}

/// Apply Great Weapon Fighting to a single die
pub fn great_weapon_fighting(rolled: u32, enabled: bool) -> DieResult {
    let value = if enabled && rolled < GREAT_WEAPON_FIGHTING_FLOOR {
        GREAT_WEAPON_FIGHTING_FLOOR
    } else {
        rolled
    };
    DieResult { rolled, value }
}

/// Roll one set of d6 and apply Great Weapon Fighting when enabled
pub fn roll_dice_set(source: &mut impl DieSource, count: u32, gwf: bool) -> DiceSet {
    let dice: Vec<DieResult> = source
        .draw_many(DAMAGE_DIE_SIDES, count)
        .into_iter()
        .map(|rolled| great_weapon_fighting(rolled, gwf))
        .collect();
    let total = dice.iter().map(|d| d.value as i32).sum();
    DiceSet { dice, total }
}

/// Roll two independent sets and keep the higher total (ties keep set 1)
pub fn roll_savage_attacker(source: &mut impl DieSource, count: u32, gwf: bool) -> SavageAttackerRoll {
    let first = roll_dice_set(source, count, gwf);
    let second = roll_dice_set(source, count, gwf);
    let chosen = if second.total > first.total { 2 } else { 1 };
    SavageAttackerRoll {
        sets: [first, second],
        chosen,
    }
}

/// Roll damage for the weapon in the given state
pub fn resolve_damage(
    mode: DamageMode,
    weapon: &WeaponState,
    source: &mut impl DieSource,
) -> DamageOutcome {
    if mode == DamageMode::Graze {
        return resolve_graze(weapon);
    }

    let multiplier = mode.dice_multiplier();
    let slashing_count = SLASHING_DICE * multiplier;
    let lightning_count = LIGHTNING_DICE * multiplier;

    // slashing dice are drawn before lightning
    let savage = if weapon.savage_attacker {
        Some(roll_savage_attacker(source, slashing_count, weapon.great_weapon_fighting))
    } else {
        None
    };
    let slashing = match &savage {
        Some(roll) => roll.kept().clone(),
        None => roll_dice_set(source, slashing_count, weapon.great_weapon_fighting),
    };
    let lightning_dice = source.draw_many(DAMAGE_DIE_SIDES, lightning_count);

    let strength_mod = weapon.strength_modifier();
    let gwm_bonus = if weapon.great_weapon_master {
        weapon.proficiency_bonus
    } else {
        0
    };

    let slashing_total = slashing
        .total
        .saturating_add(strength_mod)
        .saturating_add(gwm_bonus);
    let lightning_total: i32 = lightning_dice.iter().map(|&d| d as i32).sum();
    let grand_total = slashing_total.saturating_add(lightning_total);

    let mut lines = vec![if mode == DamageMode::Critical {
        "CRITICAL HIT! Damage roll (double dice):".to_string()
    } else {
        "Damage roll:".to_string()
    }];

    let mut breakdown = Vec::new();
    match &savage {
        Some(roll) => {
            lines.push("Savage Attacker (taking higher of two rolls):".to_string());
            for (index, set) in roll.sets.iter().enumerate() {
                let number = index + 1;
                let marker = if number == usize::from(roll.chosen) { " [CHOSEN]" } else { "" };
                lines.push(format!(
                    "    Set {}: {} = {}{}",
                    number,
                    set.describe(),
                    set.total,
                    marker
                ));
            }
            lines.push(format!(
                "    → Using Set {}: {} {}",
                roll.chosen,
                slashing.total,
                DamageType::Slashing
            ));
            breakdown.push(format!("{} {}", slashing.total, DamageType::Slashing));
        }
        None => {
            for die in &slashing.dice {
                breakdown.push(format!("{} {}", die.describe(), DamageType::Slashing));
            }
        }
    }

    breakdown.push(format!(
        "{} (from Strength Modifier) {}",
        strength_mod,
        DamageType::Slashing
    ));
    if weapon.great_weapon_master {
        breakdown.push(format!(
            "{} (Heavy Weapon Mastery [Great Weapon Master]) {}",
            gwm_bonus,
            DamageType::Slashing
        ));
    }
    breakdown.push(format!(
        "{} ({}d{}) {}",
        join_rolls(&lightning_dice),
        lightning_count,
        DAMAGE_DIE_SIDES,
        DamageType::Lightning
    ));

    lines.push(breakdown.join("\n+ "));
    lines.push(summary_line(slashing_total, lightning_total, grand_total));

    DamageOutcome {
        mode,
        rolled: true,
        slashing_total,
        lightning_total,
        grand_total,
        slashing_dice: slashing.dice,
        savage_attacker: savage,
        lightning_dice,
        narrative: lines.join("\n"),
    }
}

/// Graze: the attack modifier as slashing damage, no dice
fn resolve_graze(weapon: &WeaponState) -> DamageOutcome {
    if !weapon.weapon_mastery {
        return DamageOutcome::guidance(
            DamageMode::Graze,
            "Graze requires Weapon Mastery. Enable Weapon Mastery to deal Graze damage on a miss.",
        );
    }

    let slashing_total = weapon.total_attack_modifier();
    let narrative = [
        "Graze damage (Weapon Mastery):".to_string(),
        format!(
            "{} (from Strength Modifier) {}",
            weapon.strength_modifier(),
            DamageType::Slashing
        ),
        format!(
            "+ {} (Proficiency Bonus) {}",
            weapon.proficiency_bonus,
            DamageType::Slashing
        ),
        format!("+ {} (Attack Bonus) {}", weapon.attack_bonus, DamageType::Slashing),
        summary_line(slashing_total, 0, slashing_total),
    ]
    .join("\n");

    DamageOutcome {
        mode: DamageMode::Graze,
        rolled: true,
        slashing_total,
        lightning_total: 0,
        grand_total: slashing_total,
        slashing_dice: Vec::new(),
        savage_attacker: None,
        lightning_dice: Vec::new(),
        narrative,
    }
}

fn summary_line(slashing: i32, lightning: i32, total: i32) -> String {
    format!("= {}", totals(slashing, lightning, total))
}

fn totals(slashing: i32, lightning: i32, total: i32) -> String {
    format!(
        "{} {} + {} {} ({} total)",
        slashing,
        DamageType::Slashing,
        lightning,
        DamageType::Lightning,
        total
    )
}
