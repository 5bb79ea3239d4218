//! Dice rolling system
//!
//! Parses and rolls dice notation like "2d6+3", "1d20", "4d6-2"

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rng::DieSource;

/// Largest number of dice accepted in one request
pub const MAX_DICE_COUNT: u32 = 100;

/// Largest die accepted in one request
pub const MAX_DIE_SIDES: u32 = 1000;

/// Errors from parsing or validating a dice roll
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("missing 'd' in dice notation")]
    MissingSeparator,

    #[error("invalid dice count: {0}")]
    InvalidCount(String),

    #[error("invalid die sides: {0}")]
    InvalidSides(String),

    #[error("invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("dice count must be between 1 and {}", MAX_DICE_COUNT)]
    CountOutOfRange,

    #[error("die sides must be between 1 and {}", MAX_DIE_SIDES)]
    SidesOutOfRange,
}

/// A dice roll specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

/// Individual results of a roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolledDice {
    pub roll: DiceRoll,
    pub rolls: Vec<u32>,
    pub dice_total: i32,
    pub total: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self { count, sides, modifier }
    }

    /// Check the roll is within the accepted bounds
    pub fn validate(&self) -> Result<(), DiceError> {
        if self.count == 0 || self.count > MAX_DICE_COUNT {
            return Err(DiceError::CountOutOfRange);
        }
        if self.sides == 0 || self.sides > MAX_DIE_SIDES {
            return Err(DiceError::SidesOutOfRange);
        }
        Ok(())
    }

    /// Roll the dice from the given source
    pub fn roll_with(&self, source: &mut impl DieSource) -> RolledDice {
        let rolls = source.draw_many(self.sides, self.count);
        let dice_total = rolls.iter().map(|&r| r as i32).sum::<i32>();

        RolledDice {
            roll: *self,
            total: dice_total.saturating_add(self.modifier),
            dice_total,
            rolls,
        }
    }
}

impl RolledDice {
    /// Human-readable arithmetic, e.g. "3 + 5 + 1 + 2 = 11"
    ///
    /// A single unmodified die is shown as just its value.
    pub fn result_string(&self) -> String {
        let modifier = self.roll.modifier;
        if self.rolls.len() > 1 {
            let dice = join_rolls(&self.rolls);
            if modifier != 0 {
                format!("{}{} = {}", dice, signed_term(modifier), self.total)
            } else {
                format!("{} = {}", dice, self.total)
            }
        } else if modifier != 0 {
            format!("{}{} = {}", self.dice_total, signed_term(modifier), self.total)
        } else {
            self.dice_total.to_string()
        }
    }

    /// History line: notation followed by the arithmetic
    pub fn label(&self) -> String {
        format!("{}: {}", self.roll, self.result_string())
    }
}

impl FromStr for DiceRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Join die results with " + "
pub(crate) fn join_rolls(rolls: &[u32]) -> String {
    rolls
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Render a modifier as an infix term: " + 3", " - 2"
pub(crate) fn signed_term(value: i32) -> String {
    if value < 0 {
        format!(" - {}", value.unsigned_abs())
    } else {
        format!(" + {}", value)
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, DiceError> {
    let notation = notation.trim().to_lowercase();

    let d_pos = notation.find('d').ok_or(DiceError::MissingSeparator)?;

    // "d6" means "1d6"
    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidCount(count_str.to_string()))?
    };

    let rest = &notation[d_pos + 1..];

    let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
        let mod_str = &rest[plus_pos + 1..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..plus_pos], modifier)
    } else if let Some(minus_pos) = rest.rfind('-').filter(|&p| p > 0) {
        // includes the minus sign
        let mod_str = &rest[minus_pos..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..minus_pos], modifier)
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidSides(sides_str.to_string()))?;

    let roll = DiceRoll { count, sides, modifier };
    roll.validate()?;
    Ok(roll)
}

/// Check if a d20 roll is a natural 20 (critical hit)
pub fn is_critical(roll: u32) -> bool {
    roll == 20
}

/// Check if a d20 roll is a natural 1 (critical miss)
pub fn is_fumble(roll: u32) -> bool {
    roll == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::{ScriptedSource, ThreadRngSource};

    #[test]
    fn test_parse_basic() {
        let roll = parse_dice("2d6").unwrap();
        assert_eq!(roll, DiceRoll::new(2, 6, 0));
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(parse_dice("1d20+5").unwrap(), DiceRoll::new(1, 20, 5));
        assert_eq!(parse_dice("3d8-2").unwrap(), DiceRoll::new(3, 8, -2));
        assert_eq!(parse_dice("  2D10+3 ").unwrap(), DiceRoll::new(2, 10, 3));
        assert_eq!(parse_dice("d6").unwrap(), DiceRoll::new(1, 6, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_dice("abc"), Err(DiceError::MissingSeparator));
        assert!(matches!(parse_dice("2d"), Err(DiceError::InvalidSides(_))));
        assert!(matches!(parse_dice("xd6"), Err(DiceError::InvalidCount(_))));
        assert!(matches!(parse_dice("1d6+x"), Err(DiceError::InvalidModifier(_))));
        assert_eq!(parse_dice("0d6"), Err(DiceError::CountOutOfRange));
        assert_eq!(parse_dice("2d0"), Err(DiceError::SidesOutOfRange));
        assert_eq!(parse_dice("101d6"), Err(DiceError::CountOutOfRange));
    }

    #[test]
    fn test_roll_bounds() {
        let roll = DiceRoll::new(2, 6, 0);
        let mut source = ThreadRngSource;

        for _ in 0..100 {
            let result = roll.roll_with(&mut source);
            assert!(result.total >= 2, "Roll {} below minimum 2", result.total);
            assert!(result.total <= 12, "Roll {} above maximum 12", result.total);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceRoll::new(2, 6, 0).to_string(), "2d6");
        assert_eq!(DiceRoll::new(1, 20, 5).to_string(), "1d20+5");
        assert_eq!(DiceRoll::new(3, 8, -2).to_string(), "3d8-2");
    }

    #[test]
    fn test_result_string_multiple_dice() {
        let mut source = ScriptedSource::new(vec![3, 5, 1]);
        let rolled = DiceRoll::new(3, 6, 2).roll_with(&mut source);
        assert_eq!(rolled.rolls, vec![3, 5, 1]);
        assert_eq!(rolled.total, 11);
        assert_eq!(rolled.result_string(), "3 + 5 + 1 + 2 = 11");
        assert_eq!(rolled.label(), "3d6+2: 3 + 5 + 1 + 2 = 11");
    }

    #[test]
    fn test_result_string_single_die() {
        let mut source = ScriptedSource::new(vec![14]);
        let plain = DiceRoll::new(1, 20, 0).roll_with(&mut source);
        assert_eq!(plain.result_string(), "14");
        assert_eq!(plain.label(), "1d20: 14");

        let mut source = ScriptedSource::new(vec![14]);
        let penalised = DiceRoll::new(1, 20, -3).roll_with(&mut source);
        assert_eq!(penalised.result_string(), "14 - 3 = 11");
    }

    #[test]
    fn test_critical_fumble() {
        assert!(is_critical(20));
        assert!(!is_critical(19));
        assert!(is_fumble(1));
        assert!(!is_fumble(2));
    }
}
