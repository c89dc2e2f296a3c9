//! Nearest-within-range target selection for both combat entry points.
//!
//! Player-attack mode and aggro-tick mode share the selection rule but
//! apply different eligibility predicates. Failure is a typed reason,
//! never a panic.

use std::collections::HashMap;

use crate::combat::settings::CombatSettings;
use crate::entity::{Aggression, ProfileRegistry};
use crate::npc::NpcCombatRecord;

// ============================================================================
// Selection Result
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTarget {
    pub npc_id: String,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetFailure {
    /// No hostile candidate exists at all
    NoHostileNearby,
    /// A candidate exists but the nearest one is outside attack range
    OutOfRange { distance: f32 },
    /// The only in-range candidate is still inside its hit cooldown
    CoolingDown,
    /// The selected record references a profile that no longer exists
    MissingProfile { npc_id: String },
}

fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (x2 - x1).hypot(y2 - y1)
}

// ============================================================================
// Player-Attack Mode
// ============================================================================

/// Pick the nearest legal target for a player attack.
///
/// Candidates are hostile-tagged NPCs that are neither awaiting respawn nor
/// inside their hit cooldown. Records whose profile is missing still
/// compete on distance so a stale instance surfaces as "target data
/// missing" instead of silently redirecting the attack.
pub fn select_player_target(
    npcs: &HashMap<String, NpcCombatRecord>,
    profiles: &ProfileRegistry,
    actor_x: f32,
    actor_y: f32,
    settings: &CombatSettings,
    now: u64,
) -> Result<SelectedTarget, TargetFailure> {
    let mut nearest: Option<(&NpcCombatRecord, f32, bool)> = None;
    let mut cooling_in_range = false;

    for record in npcs.values() {
        let missing_profile = match profiles.get(&record.profile_id) {
            Some(profile) => {
                if !profile.is_hostile() {
                    continue;
                }
                false
            }
            None => true,
        };

        if record.is_awaiting_respawn(now) {
            continue;
        }

        let dist = distance(actor_x, actor_y, record.x, record.y);

        if !record.hit_cooldown_elapsed(now, settings.npc_hit_cooldown_ms) {
            if dist <= settings.attack_range_px {
                cooling_in_range = true;
            }
            continue;
        }

        if nearest.as_ref().map_or(true, |(_, best, _)| dist < *best) {
            nearest = Some((record, dist, missing_profile));
        }
    }

    match nearest {
        Some((record, dist, missing_profile)) => {
            if dist > settings.attack_range_px {
                return Err(TargetFailure::OutOfRange { distance: dist });
            }
            if missing_profile {
                return Err(TargetFailure::MissingProfile {
                    npc_id: record.id.clone(),
                });
            }
            Ok(SelectedTarget {
                npc_id: record.id.clone(),
                distance: dist,
            })
        }
        None if cooling_in_range => Err(TargetFailure::CoolingDown),
        None => Err(TargetFailure::NoHostileNearby),
    }
}

// ============================================================================
// Aggro-Tick Mode
// ============================================================================

/// Pick the nearest NPC entitled to counterattack the given player.
///
/// High-aggression NPCs always qualify; medium-aggression NPCs only while
/// their aggro lock points at this player and has not expired. Low
/// aggression never initiates.
pub fn select_aggro_attacker(
    npcs: &HashMap<String, NpcCombatRecord>,
    profiles: &ProfileRegistry,
    player_id: &str,
    player_x: f32,
    player_y: f32,
    settings: &CombatSettings,
    now: u64,
) -> Result<SelectedTarget, TargetFailure> {
    let mut nearest: Option<(&NpcCombatRecord, f32)> = None;

    for record in npcs.values() {
        let Some(profile) = profiles.get(&record.profile_id) else {
            continue;
        };
        if !profile.is_hostile() {
            continue;
        }
        if record.is_awaiting_respawn(now)
            || !record.hit_cooldown_elapsed(now, settings.npc_hit_cooldown_ms)
        {
            continue;
        }

        let qualifies = match profile.aggression {
            Aggression::High => true,
            Aggression::Medium => {
                record.aggro_target_profile_id.as_deref() == Some(player_id)
                    && record.aggro_until.map_or(false, |until| until > now)
            }
            Aggression::Low => false,
        };
        if !qualifies {
            continue;
        }

        let dist = distance(player_x, player_y, record.x, record.y);
        if nearest.as_ref().map_or(true, |(_, best)| dist < *best) {
            nearest = Some((record, dist));
        }
    }

    match nearest {
        Some((record, dist)) => {
            if dist > settings.attack_range_px {
                return Err(TargetFailure::OutOfRange { distance: dist });
            }
            Ok(SelectedTarget {
                npc_id: record.id.clone(),
                distance: dist,
            })
        }
        None => Err(TargetFailure::NoHostileNearby),
    }
}
