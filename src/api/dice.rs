//! Dice API - generic NdS+M rolls

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ApiError, AppState, JsonBody};
use crate::combat::{coerce_int, parse_dice, DiceError, DiceRoll, RolledDice, ThreadRngSource};

/// Roll request: either notation or individual fields
///
/// Individual fields are form values and fall back to 1d20+0.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiceRollRequest {
    notation: Option<String>,
    sides: Option<Value>,
    count: Option<Value>,
    modifier: Option<Value>,
}

#[derive(Debug, Serialize)]
struct DiceRollResponse {
    #[serde(flatten)]
    rolled: RolledDice,
    result: String,
    label: String,
}

/// Build the dice router
pub fn router() -> Router<AppState> {
    Router::new().route("/dice/roll", post(roll))
}

/// POST /dice/roll
async fn roll(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DiceRollRequest>,
) -> Result<Json<DiceRollResponse>, ApiError> {
    let dice = request_to_roll(&request)?;
    let rolled = dice.roll_with(&mut ThreadRngSource);
    let label = rolled.label();

    debug!(%dice, total = rolled.total, "Rolled dice");
    state.history.push(&label);

    Ok(Json(DiceRollResponse {
        result: rolled.result_string(),
        label,
        rolled,
    }))
}

fn request_to_roll(request: &DiceRollRequest) -> Result<DiceRoll, DiceError> {
    if let Some(notation) = &request.notation {
        return parse_dice(notation);
    }

    let field = |value: &Option<Value>, default: i32| {
        value.as_ref().map_or(default, |v| coerce_int(v, default))
    };
    // a zero count or side count reads as unset
    let nonzero = |value: i32, default: i32| if value == 0 { default } else { value };

    let count = nonzero(field(&request.count, 1), 1);
    let sides = nonzero(field(&request.sides, 20), 20);
    let count = u32::try_from(count).map_err(|_| DiceError::CountOutOfRange)?;
    let sides = u32::try_from(sides).map_err(|_| DiceError::SidesOutOfRange)?;

    let roll = DiceRoll::new(count, sides, field(&request.modifier, 0));
    roll.validate()?;
    Ok(roll)
}
