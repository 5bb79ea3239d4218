//! Attack roll resolution
//!
//! d20 plus the total attack modifier, with advantage and disadvantage.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dice::{is_critical, is_fumble, signed_term};
use super::rng::DieSource;

/// How the d20 is rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    #[default]
    Normal,
    /// Roll two, keep the higher
    Advantage,
    /// Roll two, keep the lower
    Disadvantage,
}

impl FromStr for RollMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(RollMode::Normal),
            "advantage" | "adv" => Ok(RollMode::Advantage),
            "disadvantage" | "dis" => Ok(RollMode::Disadvantage),
            _ => Err(()),
        }
    }
}

/// Result of an attack roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    pub mode: RollMode,
    /// Every d20 drawn, in draw order
    pub rolls: Vec<u32>,
    /// The d20 that counts
    pub natural_roll: u32,
    pub modifier: i32,
    pub total_attack: i32,
    pub is_critical_hit: bool,
    pub is_critical_miss: bool,
    pub narrative: String,
}

/// Roll an attack with the given total modifier
///
/// Critical flags are informational and never change the total.
pub fn resolve_attack(
    mode: RollMode,
    total_modifier: i32,
    source: &mut impl DieSource,
) -> AttackOutcome {
    let (rolls, natural_roll) = match mode {
        RollMode::Normal => {
            let roll = source.draw(20);
            (vec![roll], roll)
        }
        RollMode::Advantage => {
            let (first, second) = (source.draw(20), source.draw(20));
            (vec![first, second], first.max(second))
        }
        RollMode::Disadvantage => {
            let (first, second) = (source.draw(20), source.draw(20));
            (vec![first, second], first.min(second))
        }
    };

    let total_attack = (natural_roll as i32).saturating_add(total_modifier);
    let is_critical_hit = is_critical(natural_roll);
    let is_critical_miss = is_fumble(natural_roll);

    let mut narrative = match mode {
        RollMode::Normal => format!("d20 ({})", natural_roll),
        RollMode::Advantage => format!(
            "2d20 ({}, {}) take higher: {}",
            rolls[0], rolls[1], natural_roll
        ),
        RollMode::Disadvantage => format!(
            "2d20 ({}, {}) take lower: {}",
            rolls[0], rolls[1], natural_roll
        ),
    };
    narrative.push_str(&format!("{} = {}", signed_term(total_modifier), total_attack));

    if is_critical_hit {
        narrative.push_str(" - CRITICAL HIT!");
    } else if is_critical_miss {
        narrative.push_str(" - CRITICAL MISS!");
    }

    AttackOutcome {
        mode,
        rolls,
        natural_roll,
        modifier: total_modifier,
        total_attack,
        is_critical_hit,
        is_critical_miss,
        narrative,
    }
}
