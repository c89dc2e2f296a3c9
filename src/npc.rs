use serde::Serialize;

use crate::entity::NpcProfile;

// ============================================================================
// NPC Combat Record
// ============================================================================

/// Live, authoritative state for one placed NPC instance on one map.
///
/// Created with full HP when the instance is placed; mutated exclusively by
/// the combat engine. Defeat is a state, not removal — the record is never
/// deleted here.
#[derive(Debug, Clone)]
pub struct NpcCombatRecord {
    pub id: String,
    /// Owning map name
    pub map: String,
    /// Reference to the static NPC profile
    pub profile_id: String,
    // World-unit position (movement itself is handled elsewhere)
    pub x: f32,
    pub y: f32,
    // Velocity; only ever cleared here, on defeat/aggro transitions
    pub vx: f32,
    pub vy: f32,
    pub current_hp: i32,
    pub max_hp: i32,
    /// When this NPC last took damage; gates the per-NPC hit cooldown
    pub last_hit_at: Option<u64>,
    /// After defeat, when the NPC becomes targetable again
    pub respawn_at: Option<u64>,
    /// Player this NPC intends to retaliate against, and until when
    pub aggro_target_profile_id: Option<String>,
    pub aggro_until: Option<u64>,
    /// Flee destination, set only for low-aggression NPCs after a hit
    pub target_x: Option<f32>,
    pub target_y: Option<f32>,
    /// Most recent defeat (informational)
    pub defeated_at: Option<u64>,
}

impl NpcCombatRecord {
    /// Create a record for a freshly placed NPC instance: full HP, no
    /// aggro/flee/defeat state.
    pub fn from_profile(id: &str, map: &str, profile: &NpcProfile, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            map: map.to_string(),
            profile_id: profile.id.clone(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            current_hp: profile.stats.max_hp,
            max_hp: profile.stats.max_hp,
            last_hit_at: None,
            respawn_at: None,
            aggro_target_profile_id: None,
            aggro_until: None,
            target_x: None,
            target_y: None,
            defeated_at: None,
        }
    }

    /// Whether the NPC is currently defeated and waiting out its respawn
    /// window.
    pub fn is_awaiting_respawn(&self, now: u64) -> bool {
        matches!(self.respawn_at, Some(at) if at > now)
    }

    /// Whether the per-NPC hit cooldown has elapsed.
    pub fn hit_cooldown_elapsed(&self, now: u64, cooldown_ms: u64) -> bool {
        match self.last_hit_at {
            Some(at) => now.saturating_sub(at) >= cooldown_ms,
            None => true,
        }
    }

    /// Revive a defeated NPC whose respawn window has elapsed: HP is
    /// restored to max and the defeat state cleared. Records that are alive
    /// or still waiting are untouched.
    pub fn revive_if_due(&mut self, now: u64) {
        if let Some(at) = self.respawn_at {
            if at <= now {
                self.current_hp = self.max_hp;
                self.respawn_at = None;
                self.defeated_at = None;
                self.last_hit_at = None;
            }
        }
    }

    /// Zero out velocity. Movement is owned elsewhere; combat only clears
    /// it on defeat and aggro transitions.
    pub fn clear_motion(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

// ============================================================================
// NPC View for Collaborators
// ============================================================================

/// Read-only snapshot of a combat record for rendering/movement
/// collaborators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcView {
    pub id: String,
    pub profile_id: String,
    pub display_name: String,
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub level: i32,
    pub hostile: bool,
    pub disposition: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggro_target: Option<String>,
}

impl NpcView {
    pub fn new(record: &NpcCombatRecord, profile: &NpcProfile) -> Self {
        Self {
            id: record.id.clone(),
            profile_id: record.profile_id.clone(),
            display_name: profile.display_name.clone(),
            x: record.x,
            y: record.y,
            hp: record.current_hp,
            max_hp: record.max_hp,
            level: profile.stats.level,
            hostile: profile.is_hostile(),
            disposition: crate::combat::aggro::Disposition::of(record).name(),
            aggro_target: record.aggro_target_profile_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Aggression, ProfileStats};
    use std::collections::HashSet;

    fn profile() -> NpcProfile {
        NpcProfile {
            id: "slime".to_string(),
            display_name: "Slime".to_string(),
            sprite: "slime".to_string(),
            description: String::new(),
            stats: ProfileStats {
                hp: 20,
                max_hp: 20,
                atk: 4,
                def: 1,
                spd: 2,
                level: 1,
            },
            aggression: Aggression::Medium,
            tags: HashSet::from(["hostile".to_string()]),
            items: vec![],
        }
    }

    #[test]
    fn test_fresh_record_has_full_hp_and_no_state() {
        let record = NpcCombatRecord::from_profile("slime_0", "meadow", &profile(), 10.0, 20.0);
        assert_eq!(record.current_hp, 20);
        assert_eq!(record.max_hp, 20);
        assert!(record.last_hit_at.is_none());
        assert!(record.respawn_at.is_none());
        assert!(record.aggro_target_profile_id.is_none());
        assert!(record.target_x.is_none());
        assert!(record.defeated_at.is_none());
    }

    #[test]
    fn test_hit_cooldown() {
        let mut record = NpcCombatRecord::from_profile("slime_0", "meadow", &profile(), 0.0, 0.0);
        assert!(record.hit_cooldown_elapsed(1000, 700));

        record.last_hit_at = Some(1000);
        assert!(!record.hit_cooldown_elapsed(1500, 700));
        assert!(record.hit_cooldown_elapsed(1700, 700));
    }

    #[test]
    fn test_revive_restores_hp() {
        let mut record = NpcCombatRecord::from_profile("slime_0", "meadow", &profile(), 0.0, 0.0);
        record.current_hp = 0;
        record.defeated_at = Some(1000);
        record.respawn_at = Some(31_000);

        // Still waiting
        record.revive_if_due(30_000);
        assert_eq!(record.current_hp, 0);
        assert!(record.is_awaiting_respawn(30_000));

        // Window elapsed: HP restored, defeat state cleared
        record.revive_if_due(31_000);
        assert_eq!(record.current_hp, 20);
        assert!(record.respawn_at.is_none());
        assert!(record.defeated_at.is_none());
        assert!(!record.is_awaiting_respawn(31_000));
    }
}
