//! Weapon state and attack modifiers
//!
//! `WeaponState` carries the character stats and feat toggles that every
//! resolver call needs. Values arriving from forms are coerced leniently:
//! anything missing or non-numeric becomes the field default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Strength score used when the input is missing or malformed
pub const DEFAULT_STRENGTH_SCORE: i32 = 10;

/// Proficiency bonus used when the input is missing or malformed
pub const DEFAULT_PROFICIENCY_BONUS: i32 = 2;

/// Attack bonus used when the input is missing or malformed
pub const DEFAULT_ATTACK_BONUS: i32 = 0;

/// Character stats and feat toggles for the Solstora greatsword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponState {
    pub strength_score: i32,
    pub proficiency_bonus: i32,
    pub attack_bonus: i32,
    /// Weapon Mastery (Graze)
    pub weapon_mastery: bool,
    /// Great Weapon Master: proficiency bonus added to damage
    pub great_weapon_master: bool,
    /// Great Weapon Fighting: damage dice showing 1 or 2 count as 3
    pub great_weapon_fighting: bool,
    /// Savage Attacker: roll the damage dice twice, keep the better set
    pub savage_attacker: bool,
}

impl Default for WeaponState {
    fn default() -> Self {
        Self {
            strength_score: DEFAULT_STRENGTH_SCORE,
            proficiency_bonus: DEFAULT_PROFICIENCY_BONUS,
            attack_bonus: DEFAULT_ATTACK_BONUS,
            weapon_mastery: false,
            great_weapon_master: false,
            great_weapon_fighting: false,
            savage_attacker: false,
        }
    }
}

impl WeaponState {
    /// Strength modifier derived from the score
    pub fn strength_modifier(&self) -> i32 {
        strength_modifier(self.strength_score)
    }

    /// Modifier added to the d20 on an attack roll
    pub fn total_attack_modifier(&self) -> i32 {
        total_attack_modifier(self.strength_score, self.proficiency_bonus, self.attack_bonus)
    }

    /// Build a state from loosely typed form values
    pub fn from_form(form: &WeaponForm) -> Self {
        let mut state = Self::default();
        state.apply_form(form);
        state
    }

    /// Overwrite fields present in the form, leaving absent ones untouched
    ///
    /// A field that is present but malformed resets to its default.
    pub fn apply_form(&mut self, form: &WeaponForm) {
        if let Some(v) = &form.strength_score {
            self.strength_score = coerce_int(v, DEFAULT_STRENGTH_SCORE);
        }
        if let Some(v) = &form.proficiency_bonus {
            self.proficiency_bonus = coerce_int(v, DEFAULT_PROFICIENCY_BONUS);
        }
        if let Some(v) = &form.attack_bonus {
            self.attack_bonus = coerce_int(v, DEFAULT_ATTACK_BONUS);
        }
        if let Some(v) = &form.weapon_mastery {
            self.weapon_mastery = coerce_bool(v);
        }
        if let Some(v) = &form.great_weapon_master {
            self.great_weapon_master = coerce_bool(v);
        }
        if let Some(v) = &form.great_weapon_fighting {
            self.great_weapon_fighting = coerce_bool(v);
        }
        if let Some(v) = &form.savage_attacker {
            self.savage_attacker = coerce_bool(v);
        }
    }
}

/// Raw form values; every field may be a number, string, bool or absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponForm {
    pub strength_score: Option<Value>,
    pub proficiency_bonus: Option<Value>,
    pub attack_bonus: Option<Value>,
    pub weapon_mastery: Option<Value>,
    pub great_weapon_master: Option<Value>,
    pub great_weapon_fighting: Option<Value>,
    pub savage_attacker: Option<Value>,
}

/// Ability modifier: floor((score - 10) / 2)
pub fn strength_modifier(strength_score: i32) -> i32 {
    // div_euclid by a positive divisor rounds toward negative infinity
    (strength_score as i64 - 10).div_euclid(2) as i32
}

/// Strength modifier plus proficiency plus any flat attack bonus
pub fn total_attack_modifier(strength_score: i32, proficiency_bonus: i32, attack_bonus: i32) -> i32 {
    strength_modifier(strength_score)
        .saturating_add(proficiency_bonus)
        .saturating_add(attack_bonus)
}

/// Coerce a form value to an integer, falling back to `default`
///
/// Strings are read as an optional sign followed by leading digits, so
/// "12abc" reads as 12 while "" and "abc" fall back.
pub fn coerce_int(value: &Value, default: i32) -> i32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(default),
        Value::String(s) => leading_int(s).unwrap_or(default),
        _ => default,
    }
}

/// Coerce a form value to a toggle
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "on" | "1"),
        _ => false,
    }
}

fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1i64, &s[1..]),
        Some(b'+') => (1i64, &s[1..]),
        _ => (1i64, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    i32::try_from(sign * magnitude).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strength_modifier_floors() {
        let cases = [
            (1, -5),
            (8, -1),
            (9, -1),
            (10, 0),
            (11, 0),
            (12, 1),
            (15, 2),
            (20, 5),
            (30, 10),
            (0, -5),
            (-1, -6),
        ];
        for (score, expected) in cases {
            assert_eq!(strength_modifier(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_strength_modifier_extremes() {
        assert_eq!(strength_modifier(i32::MIN), -1_073_741_829);
        assert_eq!(strength_modifier(i32::MAX), 1_073_741_818);
    }

    #[test]
    fn test_total_attack_modifier() {
        assert_eq!(total_attack_modifier(16, 2, 1), 6);
        assert_eq!(total_attack_modifier(8, 2, 0), 1);
        assert_eq!(total_attack_modifier(10, 2, 0), 2);
    }

    #[test]
    fn test_total_attack_modifier_is_pure() {
        let first = total_attack_modifier(17, 3, 1);
        let second = total_attack_modifier(17, 3, 1);
        assert_eq!(first, second);

        let state = WeaponState {
            strength_score: 17,
            proficiency_bonus: 3,
            attack_bonus: 1,
            ..Default::default()
        };
        assert_eq!(state.total_attack_modifier(), state.total_attack_modifier());
        assert_eq!(state.total_attack_modifier(), 7);
    }

    #[test]
    fn test_defaults() {
        let state = WeaponState::default();
        assert_eq!(state.strength_score, 10);
        assert_eq!(state.proficiency_bonus, 2);
        assert_eq!(state.attack_bonus, 0);
        assert!(!state.weapon_mastery);
        assert!(!state.savage_attacker);
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int(&json!(16), 10), 16);
        assert_eq!(coerce_int(&json!(-3), 0), -3);
        assert_eq!(coerce_int(&json!(12.9), 10), 12);
        assert_eq!(coerce_int(&json!("18"), 10), 18);
        assert_eq!(coerce_int(&json!(" 12abc"), 10), 12);
        assert_eq!(coerce_int(&json!("-2"), 0), -2);
        assert_eq!(coerce_int(&json!(""), 10), 10);
        assert_eq!(coerce_int(&json!("abc"), 2), 2);
        assert_eq!(coerce_int(&json!("-"), 2), 2);
        assert_eq!(coerce_int(&json!(null), 10), 10);
        assert_eq!(coerce_int(&json!(true), 10), 10);
        assert_eq!(coerce_int(&json!("99999999999"), 10), 10);
    }

    #[test]
    fn test_coerce_bool() {
        assert!(coerce_bool(&json!(true)));
        assert!(coerce_bool(&json!("on")));
        assert!(coerce_bool(&json!("TRUE")));
        assert!(coerce_bool(&json!(1)));
        assert!(!coerce_bool(&json!(false)));
        assert!(!coerce_bool(&json!("off")));
        assert!(!coerce_bool(&json!(null)));
    }

    #[test]
    fn test_from_form_fails_soft() {
        let form: WeaponForm = serde_json::from_value(json!({
            "strength_score": "not a number",
            "proficiency_bonus": "",
            "attack_bonus": "1",
            "savage_attacker": true
        }))
        .unwrap();

        let state = WeaponState::from_form(&form);
        assert_eq!(state.strength_score, 10);
        assert_eq!(state.proficiency_bonus, 2);
        assert_eq!(state.attack_bonus, 1);
        assert!(state.savage_attacker);
        assert!(!state.great_weapon_fighting);
    }

    #[test]
    fn test_apply_form_keeps_absent_fields() {
        let mut state = WeaponState {
            strength_score: 18,
            great_weapon_master: true,
            ..Default::default()
        };
        let form: WeaponForm = serde_json::from_value(json!({ "attack_bonus": 2 })).unwrap();

        state.apply_form(&form);
        assert_eq!(state.strength_score, 18);
        assert_eq!(state.attack_bonus, 2);
        assert!(state.great_weapon_master);
    }
}
