use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use serde::Serialize;

use crate::db::{Database, StoreError};

// ============================================================================
// Player Profile
// ============================================================================

pub const STARTING_HP: i32 = 100;
pub const STARTING_ATK: i32 = 10;
pub const STARTING_DEF: i32 = 2;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub def: i32,
    pub xp: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    // Last persisted position; combat range checks use the caller-supplied
    // position instead
    pub x: f32,
    pub y: f32,
    pub stats: PlayerStats,
}

impl PlayerProfile {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            x: 0.0,
            y: 0.0,
            stats: PlayerStats {
                hp: STARTING_HP,
                max_hp: STARTING_HP,
                atk: STARTING_ATK,
                def: STARTING_DEF,
                xp: 0,
            },
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.hp <= 0
    }
}

// ============================================================================
// Player Store
// ============================================================================

/// In-memory player records with sqlite-backed persistence. Records are the
/// authoritative copy while the server runs; the database is load-on-join
/// plus best-effort write-back.
pub struct PlayerStore {
    players: RwLock<HashMap<String, PlayerProfile>>,
    db: Option<Arc<Database>>,
}

impl PlayerStore {
    pub fn new(db: Option<Arc<Database>>) -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            db,
        }
    }

    /// Load a player from the database or create a fresh one, and make it
    /// live. Database failures propagate; the caller surfaces them as an
    /// infrastructure error.
    pub async fn load_or_create(&self, id: &str, name: &str) -> Result<PlayerProfile, StoreError> {
        if let Some(existing) = self.get(id).await {
            return Ok(existing);
        }

        let profile = match &self.db {
            Some(db) => match db.load_player(id).await? {
                Some(saved) => saved,
                None => {
                    let fresh = PlayerProfile::new(id, name);
                    db.save_player(&fresh).await?;
                    info!("Created player {} ({})", name, id);
                    fresh
                }
            },
            None => PlayerProfile::new(id, name),
        };

        self.players
            .write()
            .await
            .insert(id.to_string(), profile.clone());
        Ok(profile)
    }

    /// Insert a live record directly (tests and tooling).
    pub async fn insert(&self, profile: PlayerProfile) {
        self.players
            .write()
            .await
            .insert(profile.id.clone(), profile);
    }

    pub async fn get(&self, id: &str) -> Option<PlayerProfile> {
        self.players.read().await.get(id).cloned()
    }

    /// Apply damage to a player, flooring HP at 0. Returns the HP after the
    /// hit, or None if the player is unknown.
    pub async fn apply_damage(&self, id: &str, damage: i32) -> Option<i32> {
        let mut players = self.players.write().await;
        let player = players.get_mut(id)?;
        player.stats.hp = (player.stats.hp - damage).max(0);
        Some(player.stats.hp)
    }

    /// Award experience. Returns the new total, or None if the player is
    /// unknown.
    pub async fn award_xp(&self, id: &str, amount: i64) -> Option<i64> {
        let mut players = self.players.write().await;
        let player = players.get_mut(id)?;
        player.stats.xp += amount;
        Some(player.stats.xp)
    }

    /// Write one player back to the database. Best-effort: combat results
    /// stand even if the save fails.
    pub async fn persist(&self, id: &str) {
        let (Some(db), Some(profile)) = (&self.db, self.get(id).await) else {
            return;
        };
        if let Err(e) = db.save_player(&profile).await {
            warn!("Failed to persist player {}: {}", id, e);
        }
    }

    /// Write every live player back to the database. Returns how many were
    /// saved.
    pub async fn persist_all(&self) -> usize {
        let Some(db) = &self.db else {
            return 0;
        };
        let snapshot: Vec<PlayerProfile> = self.players.read().await.values().cloned().collect();
        let mut saved = 0;
        for profile in &snapshot {
            match db.save_player(profile).await {
                Ok(()) => saved += 1,
                Err(e) => warn!("Failed to persist player {}: {}", profile.id, e),
            }
        }
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_damage_floors_at_zero() {
        let store = PlayerStore::new(None);
        store.insert(PlayerProfile::new("p1", "Ada")).await;

        assert_eq!(store.apply_damage("p1", 30).await, Some(70));
        assert_eq!(store.apply_damage("p1", 500).await, Some(0));
        assert_eq!(store.apply_damage("missing", 5).await, None);
    }

    #[tokio::test]
    async fn test_award_xp_accumulates() {
        let store = PlayerStore::new(None);
        store.insert(PlayerProfile::new("p1", "Ada")).await;

        assert_eq!(store.award_xp("p1", 8).await, Some(8));
        assert_eq!(store.award_xp("p1", 16).await, Some(24));
    }

    #[tokio::test]
    async fn test_load_or_create_without_db() {
        let store = PlayerStore::new(None);
        let profile = store.load_or_create("p1", "Ada").await.unwrap();
        assert_eq!(profile.stats.hp, STARTING_HP);
        assert!(store.get("p1").await.is_some());
    }
}
