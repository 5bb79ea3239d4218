//! Combat system module
//!
//! Implements the Solstora greatsword calculator with:
//! - Dice rolling (e.g., "2d6+3") from an injected die source
//! - Attack resolution with advantage and disadvantage
//! - Damage resolution with critical hits, Graze, and feats
//! - Lenient weapon state built from form values

mod attack;
mod damage;
mod dice;
mod rng;
mod weapon;

pub use attack::{resolve_attack, AttackOutcome, RollMode};
pub use damage::{
    great_weapon_fighting, resolve_damage, roll_dice_set, roll_savage_attacker, DamageMode,
    DamageOutcome, DamageType, DiceSet, DieResult, SavageAttackerRoll,
};
pub use dice::{
    is_critical, is_fumble, parse_dice, DiceError, DiceRoll, RolledDice, MAX_DICE_COUNT,
    MAX_DIE_SIDES,
};
pub use rng::{DieSource, ScriptedSource, ThreadRngSource};
pub use weapon::{
    coerce_bool, coerce_int, strength_modifier, total_attack_modifier, WeaponForm, WeaponState,
};
