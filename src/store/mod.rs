//! Saved weapon state
//!
//! Stats and feat toggles are stored as two JSON documents under the
//! `dnd-near-` namespace. Loading never fails on bad data: a missing key,
//! unparseable JSON or a malformed field falls back to the default.

use serde_json::{json, Map, Value};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, warn};

use crate::combat::{coerce_bool, coerce_int, WeaponState};

/// Prefix for every stored key
pub const STORAGE_KEY_PREFIX: &str = "dnd-near-";

/// Key holding strength, proficiency and attack bonus
pub const STATS_KEY: &str = "dnd-near-stats";

/// Key holding the feat toggles
pub const FEATS_KEY: &str = "dnd-near-feats";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for `WeaponState`
pub struct WeaponStore {
    pool: SqlitePool,
}

impl WeaponStore {
    /// Create a new store over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the saved state, substituting defaults for anything unusable
    pub async fn load(&self) -> Result<WeaponState, StoreError> {
        let mut state = WeaponState::default();

        if let Some(stats) = self.read_document(STATS_KEY).await? {
            if let Some(v) = stats.get("strScore") {
                state.strength_score = coerce_int(v, state.strength_score);
            }
            if let Some(v) = stats.get("profBonus") {
                state.proficiency_bonus = coerce_int(v, state.proficiency_bonus);
            }
            if let Some(v) = stats.get("attackBonus") {
                state.attack_bonus = coerce_int(v, state.attack_bonus);
            }
        }

        if let Some(feats) = self.read_document(FEATS_KEY).await? {
            let toggle = |name: &str| feats.get(name).map(coerce_bool).unwrap_or(false);
            state.weapon_mastery = toggle("weaponMastery");
            state.great_weapon_master = toggle("greatWeaponMaster");
            state.great_weapon_fighting = toggle("greatWeaponFighting");
            state.savage_attacker = toggle("savageAttacker");
        }

        Ok(state)
    }

    /// Save the full state
    pub async fn save(&self, state: &WeaponState) -> Result<(), StoreError> {
        let stats = json!({
            "strScore": state.strength_score,
            "profBonus": state.proficiency_bonus,
            "attackBonus": state.attack_bonus,
        });
        let feats = json!({
            "weaponMastery": state.weapon_mastery,
            "greatWeaponMaster": state.great_weapon_master,
            "greatWeaponFighting": state.great_weapon_fighting,
            "savageAttacker": state.savage_attacker,
        });

        // both documents land together or not at all
        let mut tx = self.pool.begin().await?;
        write_document(&mut *tx, STATS_KEY, &stats).await?;
        write_document(&mut *tx, FEATS_KEY, &feats).await?;
        tx.commit().await?;

        debug!(?state, "Saved weapon state");
        Ok(())
    }

    /// Remove all saved data so the next load returns defaults
    pub async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM saved_state WHERE key LIKE ?")
            .bind(format!("{}%", STORAGE_KEY_PREFIX))
            .execute(&self.pool)
            .await?;
        debug!("Cleared saved weapon state");
        Ok(())
    }

    async fn read_document(&self, key: &str) -> Result<Option<Map<String, Value>>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM saved_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some((raw,)) = row else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(other) => {
                warn!(key, value = %other, "Saved state is not an object, using defaults");
                Ok(None)
            }
            Err(e) => {
                warn!(key, error = %e, "Saved state is corrupt, using defaults");
                Ok(None)
            }
        }
    }
}

async fn write_document(
    conn: &mut SqliteConnection,
    key: &str,
    value: &Value,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    let updated_at = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO saved_state (key, value, updated_at) VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(&raw)
    .bind(&updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
