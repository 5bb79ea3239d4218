//! Weapon API - saved state, attack rolls and damage rolls

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiError, AppState, JsonBody};
use crate::combat::{
    resolve_attack, resolve_damage, AttackOutcome, DamageMode, DamageOutcome, RollMode,
    ThreadRngSource, WeaponForm, WeaponState,
};

/// Saved state plus the derived modifiers
#[derive(Debug, Serialize)]
struct WeaponResponse {
    weapon: WeaponState,
    strength_modifier: i32,
    total_attack_modifier: i32,
}

impl From<WeaponState> for WeaponResponse {
    fn from(weapon: WeaponState) -> Self {
        Self {
            strength_modifier: weapon.strength_modifier(),
            total_attack_modifier: weapon.total_attack_modifier(),
            weapon,
        }
    }
}

/// Attack or damage request
///
/// `weapon` fields override the saved state for this roll only.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RollRequest {
    mode: Option<String>,
    weapon: Option<WeaponForm>,
}

/// Build the weapon router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/weapon",
            get(get_weapon).put(update_weapon).delete(reset_weapon),
        )
        .route("/weapon/attack", post(roll_attack))
        .route("/weapon/damage", post(roll_damage))
}

/// GET /weapon
async fn get_weapon(State(state): State<AppState>) -> Result<Json<WeaponResponse>, ApiError> {
    let weapon = state.weapons.load().await?;
    Ok(Json(weapon.into()))
}

/// PUT /weapon
/// Accepts form values; malformed fields fall back to defaults
async fn update_weapon(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<WeaponForm>,
) -> Result<Json<WeaponResponse>, ApiError> {
    let mut weapon = state.weapons.load().await?;
    weapon.apply_form(&form);
    state.weapons.save(&weapon).await?;

    info!(
        strength = weapon.strength_score,
        proficiency = weapon.proficiency_bonus,
        attack_bonus = weapon.attack_bonus,
        "Weapon state updated"
    );
    Ok(Json(weapon.into()))
}

/// DELETE /weapon
async fn reset_weapon(State(state): State<AppState>) -> Result<Json<WeaponResponse>, ApiError> {
    state.weapons.clear().await?;
    info!("Weapon state reset to defaults");
    Ok(Json(WeaponState::default().into()))
}

/// POST /weapon/attack
async fn roll_attack(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RollRequest>,
) -> Result<Json<AttackOutcome>, ApiError> {
    let mode = parse_mode::<RollMode>("attack", request.mode.as_deref())?;
    let weapon = effective_weapon(&state, request.weapon.as_ref()).await?;

    let outcome = resolve_attack(mode, weapon.total_attack_modifier(), &mut ThreadRngSource);
    debug!(?mode, total = outcome.total_attack, natural = outcome.natural_roll, "Attack rolled");

    state
        .history
        .push(&format!("Attack roll: {}", outcome.narrative));
    Ok(Json(outcome))
}

/// POST /weapon/damage
/// Graze without Weapon Mastery returns a guidance outcome, not an error
async fn roll_damage(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RollRequest>,
) -> Result<Json<DamageOutcome>, ApiError> {
    let mode = parse_mode::<DamageMode>("damage", request.mode.as_deref())?;
    let weapon = effective_weapon(&state, request.weapon.as_ref()).await?;

    let outcome = resolve_damage(mode, &weapon, &mut ThreadRngSource);
    debug!(?mode, total = outcome.grand_total, rolled = outcome.rolled, "Damage rolled");

    if outcome.rolled {
        state.history.push(&outcome.history_text());
    }
    Ok(Json(outcome))
}

fn parse_mode<M>(kind: &'static str, value: Option<&str>) -> Result<M, ApiError>
where
    M: std::str::FromStr + Default,
{
    match value {
        None => Ok(M::default()),
        Some(v) => v.parse().map_err(|_| ApiError::UnknownMode {
            kind,
            value: v.to_string(),
        }),
    }
}

async fn effective_weapon(
    state: &AppState,
    overrides: Option<&WeaponForm>,
) -> Result<WeaponState, ApiError> {
    let mut weapon = state.weapons.load().await?;
    if let Some(form) = overrides {
        weapon.apply_form(form);
    }
    Ok(weapon)
}
