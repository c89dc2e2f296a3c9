//! Post-hit disposition of a surviving NPC.
//!
//! The persisted record stores disposition as loose optional fields
//! (`aggro_target_profile_id`/`aggro_until`/`target_x`/`target_y`/
//! `respawn_at`). This module gives those fields one tagged representation
//! so an NPC can never be both aggroed and fleeing at once.

use crate::entity::Aggression;
use crate::npc::NpcCombatRecord;

/// How long an NPC remembers its attacker after a hit.
pub const AGGRO_MEMORY_MS: u64 = 10_000;

/// How far a low-aggression NPC flees from its attacker, in world units.
pub const FLEE_DISTANCE_PX: f32 = 96.0;

// ============================================================================
// Disposition
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Idle,
    Aggroed { target: String, until: u64 },
    Fleeing { to_x: f32, to_y: f32 },
    Defeated { respawn_at: u64 },
}

impl Disposition {
    /// Read the disposition out of a flat record. Defeat wins over stale
    /// aggro/flee fields, flee over aggro, so a record that was written by
    /// an older, looser writer still collapses to one state.
    pub fn of(record: &NpcCombatRecord) -> Self {
        if let Some(respawn_at) = record.respawn_at {
            return Disposition::Defeated { respawn_at };
        }
        if let (Some(to_x), Some(to_y)) = (record.target_x, record.target_y) {
            return Disposition::Fleeing { to_x, to_y };
        }
        if let (Some(target), Some(until)) =
            (record.aggro_target_profile_id.as_ref(), record.aggro_until)
        {
            return Disposition::Aggroed {
                target: target.clone(),
                until,
            };
        }
        Disposition::Idle
    }

    /// Write this disposition back into the flat record, clearing every
    /// field belonging to the other states.
    pub fn write_to(&self, record: &mut NpcCombatRecord) {
        record.aggro_target_profile_id = None;
        record.aggro_until = None;
        record.target_x = None;
        record.target_y = None;
        record.respawn_at = None;

        match self {
            Disposition::Idle => {}
            Disposition::Aggroed { target, until } => {
                record.aggro_target_profile_id = Some(target.clone());
                record.aggro_until = Some(*until);
            }
            Disposition::Fleeing { to_x, to_y } => {
                record.target_x = Some(*to_x);
                record.target_y = Some(*to_y);
            }
            Disposition::Defeated { respawn_at } => {
                record.respawn_at = Some(*respawn_at);
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Disposition::Idle => "idle",
            Disposition::Aggroed { .. } => "aggroed",
            Disposition::Fleeing { .. } => "fleeing",
            Disposition::Defeated { .. } => "defeated",
        }
    }
}

// ============================================================================
// Hit Reaction
// ============================================================================

/// Decide the next disposition of an NPC that survived a player hit.
///
/// Low aggression flees directly away from the attacker; medium and high
/// lock onto the attacker for `AGGRO_MEMORY_MS`.
pub fn react_to_hit(
    aggression: Aggression,
    attacker_id: &str,
    attacker_x: f32,
    attacker_y: f32,
    npc_x: f32,
    npc_y: f32,
    now: u64,
) -> Disposition {
    match aggression {
        Aggression::Low => {
            let (ux, uy) = away_from(attacker_x, attacker_y, npc_x, npc_y);
            Disposition::Fleeing {
                to_x: npc_x + ux * FLEE_DISTANCE_PX,
                to_y: npc_y + uy * FLEE_DISTANCE_PX,
            }
        }
        Aggression::Medium | Aggression::High => Disposition::Aggroed {
            target: attacker_id.to_string(),
            until: now + AGGRO_MEMORY_MS,
        },
    }
}

/// Unit vector pointing from the attacker toward the NPC. An attacker
/// standing exactly on the NPC pushes it along +x.
fn away_from(attacker_x: f32, attacker_y: f32, npc_x: f32, npc_y: f32) -> (f32, f32) {
    let dx = npc_x - attacker_x;
    let dy = npc_y - attacker_y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        (1.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}
