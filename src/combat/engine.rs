//! Server-authoritative combat resolution.
//!
//! Two entry points share the per-NPC combat records: a player-initiated
//! attack and the periodic hostile-counterattack tick. Each invocation
//! reads the relevant records fresh, takes the per-map NPC write lock once,
//! and applies its whole read-modify-write under it, so concurrent attacks
//! against one NPC resolve against each other's results rather than stale
//! snapshots.

use std::sync::Arc;

use crate::combat::aggro::{self, Disposition, AGGRO_MEMORY_MS};
use crate::combat::damage::{roll_damage, NPC_VS_PLAYER_DEF_COEFF, PLAYER_VS_NPC_DEF_COEFF};
use crate::combat::loot;
use crate::combat::settings;
use crate::combat::target::{self, TargetFailure};
use crate::entity::ProfileRegistry;
use crate::item::WorldItemStore;
use crate::map::MapRegistry;
use crate::player::PlayerStore;
use crate::protocol::{AggroTickOutcome, AttackOutcome, AttackRequest, AggroTickRequest, LootDrop};
use crate::world::WorldState;

/// How long a defeated NPC stays untargetable before it revives.
pub const RESPAWN_MS: u64 = 30_000;

// ============================================================================
// Policy Rejections
// ============================================================================

/// Expected game conditions that stop a resolution. These are results, not
/// errors: handlers render them as `{success: false, reason}` and never
/// throw for them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombatRejection {
    #[error("Unknown map.")]
    UnknownMap,
    #[error("Combat is disabled on this map.")]
    CombatDisabled,
    #[error("Attacker not found.")]
    AttackerNotFound,
    #[error("Defeated players cannot attack.")]
    AttackerDefeated,
    #[error("No hostile NPC nearby.")]
    NoHostileNearby,
    #[error("No hostile NPC in attack range.")]
    OutOfRange,
    #[error("Target is still recovering from the last hit.")]
    TargetCoolingDown,
    #[error("Target data is missing.")]
    TargetDataMissing,
    #[error("Player not found.")]
    PlayerNotFound,
    #[error("Player is already defeated.")]
    PlayerDefeated,
}

impl From<TargetFailure> for CombatRejection {
    fn from(failure: TargetFailure) -> Self {
        match failure {
            TargetFailure::NoHostileNearby => CombatRejection::NoHostileNearby,
            TargetFailure::OutOfRange { .. } => CombatRejection::OutOfRange,
            TargetFailure::CoolingDown => CombatRejection::TargetCoolingDown,
            TargetFailure::MissingProfile { .. } => CombatRejection::TargetDataMissing,
        }
    }
}

// ============================================================================
// Combat Engine
// ============================================================================

pub struct CombatEngine {
    maps: Arc<MapRegistry>,
    profiles: Arc<ProfileRegistry>,
    players: Arc<PlayerStore>,
    world: Arc<WorldState>,
    items: Arc<WorldItemStore>,
}

impl CombatEngine {
    pub fn new(
        maps: Arc<MapRegistry>,
        profiles: Arc<ProfileRegistry>,
        players: Arc<PlayerStore>,
        world: Arc<WorldState>,
        items: Arc<WorldItemStore>,
    ) -> Self {
        Self {
            maps,
            profiles,
            players,
            world,
            items,
        }
    }

    // ------------------------------------------------------------------------
    // Entry point A: player attack
    // ------------------------------------------------------------------------

    pub async fn resolve_player_attack(&self, req: &AttackRequest, now: u64) -> AttackOutcome {
        let Some(map_def) = self.maps.get(&req.map_name) else {
            return AttackOutcome::rejected(CombatRejection::UnknownMap);
        };
        if !map_def.combat_enabled {
            return AttackOutcome::rejected(CombatRejection::CombatDisabled);
        }
        let resolved = settings::resolve(&map_def.combat);

        let Some(player) = self.players.get(&req.actor_id).await else {
            tracing::debug!("Attack rejected: player {} not found", req.actor_id);
            return AttackOutcome::rejected(CombatRejection::AttackerNotFound);
        };
        if player.is_defeated() {
            return AttackOutcome::rejected(CombatRejection::AttackerDefeated);
        }

        let instance = self
            .world
            .get_or_spawn(&req.map_name, map_def, &self.profiles);

        // Everything that touches the NPC record happens under one write
        // lock: selection, damage, and the full state transition.
        struct Resolution {
            profile_id: String,
            target_name: String,
            distance: f32,
            damage_dealt: i32,
            counter_damage: Option<i32>,
            target_hp: i32,
            target_max_hp: i32,
            defeated: bool,
            xp: i64,
            npc_x: f32,
            npc_y: f32,
        }

        let resolution = {
            let mut npcs = instance.npcs.write().await;

            // Defeated NPCs whose respawn window has elapsed come back at
            // full HP before they can be targeted again.
            for record in npcs.values_mut() {
                record.revive_if_due(now);
            }

            let selected = match target::select_player_target(
                &npcs,
                &self.profiles,
                req.x,
                req.y,
                &resolved,
                now,
            ) {
                Ok(selected) => selected,
                Err(failure) => {
                    tracing::debug!(
                        "{} attack on {} rejected: {:?}",
                        req.actor_id,
                        req.map_name,
                        failure
                    );
                    return AttackOutcome::rejected(CombatRejection::from(failure));
                }
            };

            let Some(record) = npcs.get_mut(&selected.npc_id) else {
                return AttackOutcome::rejected(CombatRejection::TargetDataMissing);
            };
            let Some(profile) = self.profiles.get(&record.profile_id) else {
                return AttackOutcome::rejected(CombatRejection::TargetDataMissing);
            };

            let mut rng = rand::thread_rng();
            let damage_dealt = roll_damage(
                player.stats.atk,
                profile.stats.def,
                PLAYER_VS_NPC_DEF_COEFF,
                resolved.damage_variance_pct,
                &mut rng,
            );
            let hp_after = (record.current_hp - damage_dealt).max(0);

            if hp_after <= 0 {
                // Defeat: a killing blow is never also punished
                record.current_hp = 0;
                record.defeated_at = Some(now);
                Disposition::Defeated {
                    respawn_at: now + RESPAWN_MS,
                }
                .write_to(record);
                record.clear_motion();

                Resolution {
                    profile_id: record.profile_id.clone(),
                    target_name: profile.display_name.clone(),
                    distance: selected.distance,
                    damage_dealt,
                    counter_damage: None,
                    target_hp: 0,
                    target_max_hp: record.max_hp,
                    defeated: true,
                    xp: loot::xp_reward(profile.stats.level),
                    npc_x: record.x,
                    npc_y: record.y,
                }
            } else {
                // Survival: the NPC strikes back and re-evaluates its mood
                record.current_hp = hp_after;
                record.last_hit_at = Some(now);

                let disposition = aggro::react_to_hit(
                    profile.aggression,
                    &req.actor_id,
                    req.x,
                    req.y,
                    record.x,
                    record.y,
                    now,
                );
                let locked_on = matches!(disposition, Disposition::Aggroed { .. });
                disposition.write_to(record);
                if locked_on {
                    record.clear_motion();
                }

                let counter = roll_damage(
                    profile.stats.atk,
                    player.stats.def,
                    NPC_VS_PLAYER_DEF_COEFF,
                    resolved.damage_variance_pct,
                    &mut rng,
                );

                Resolution {
                    profile_id: record.profile_id.clone(),
                    target_name: profile.display_name.clone(),
                    distance: selected.distance,
                    damage_dealt,
                    counter_damage: Some(counter),
                    target_hp: hp_after,
                    target_max_hp: record.max_hp,
                    defeated: false,
                    xp: 0,
                    npc_x: record.x,
                    npc_y: record.y,
                }
            }
        };

        // NPC state is committed; now apply the player side and rewards.
        let mut damage_taken = None;
        if let Some(counter) = resolution.counter_damage {
            damage_taken = self.players.apply_damage(&req.actor_id, counter).await.map(|_| counter);
        }
        let mut xp_gained = None;
        if resolution.defeated && resolution.xp > 0 {
            self.players.award_xp(&req.actor_id, resolution.xp).await;
            xp_gained = Some(resolution.xp);
        }
        self.players.persist(&req.actor_id).await;

        let mut dropped = None;
        if resolution.defeated {
            if let Some(profile) = self.profiles.get(&resolution.profile_id) {
                if let Some(item) = loot::spawn_drop(
                    &self.items,
                    profile,
                    &req.map_name,
                    resolution.npc_x,
                    resolution.npc_y,
                    now,
                )
                .await
                {
                    dropped = Some(LootDrop {
                        item_id: item.item_id,
                        instance_id: item.id,
                        x: item.x,
                        y: item.y,
                    });
                }
            }
        }

        if resolution.defeated {
            tracing::info!(
                "{} defeated {} on {} ({} damage, {} xp)",
                req.actor_id,
                resolution.target_name,
                req.map_name,
                resolution.damage_dealt,
                resolution.xp
            );
        } else {
            tracing::info!(
                "{} deals {} damage to {} on {} (HP: {}/{})",
                req.actor_id,
                resolution.damage_dealt,
                resolution.target_name,
                req.map_name,
                resolution.target_hp,
                resolution.target_max_hp
            );
        }

        AttackOutcome {
            success: true,
            reason: None,
            target_name: Some(resolution.target_name),
            distance: Some(resolution.distance),
            damage_dealt: Some(resolution.damage_dealt),
            damage_taken,
            target_hp: Some(resolution.target_hp),
            target_max_hp: Some(resolution.target_max_hp),
            defeated: resolution.defeated,
            xp_gained,
            loot: dropped,
            settings: Some(resolved),
        }
    }

    // ------------------------------------------------------------------------
    // Entry point B: hostile-counterattack tick
    // ------------------------------------------------------------------------

    pub async fn resolve_aggro_tick(&self, req: &AggroTickRequest, now: u64) -> AggroTickOutcome {
        let Some(map_def) = self.maps.get(&req.map_name) else {
            return AggroTickOutcome::rejected(CombatRejection::UnknownMap);
        };
        if !map_def.combat_enabled {
            return AggroTickOutcome::rejected(CombatRejection::CombatDisabled);
        }
        let resolved = settings::resolve(&map_def.combat);

        let Some(player) = self.players.get(&req.actor_id).await else {
            return AggroTickOutcome::rejected(CombatRejection::PlayerNotFound);
        };
        if player.is_defeated() {
            return AggroTickOutcome::rejected(CombatRejection::PlayerDefeated);
        }

        let instance = self
            .world
            .get_or_spawn(&req.map_name, map_def, &self.profiles);

        let (attacker_name, damage, aggression) = {
            let mut npcs = instance.npcs.write().await;
            for record in npcs.values_mut() {
                record.revive_if_due(now);
            }

            let selected = match target::select_aggro_attacker(
                &npcs,
                &self.profiles,
                &req.actor_id,
                req.x,
                req.y,
                &resolved,
                now,
            ) {
                Ok(selected) => selected,
                Err(failure) => {
                    return AggroTickOutcome::rejected(CombatRejection::from(failure));
                }
            };

            let Some(record) = npcs.get_mut(&selected.npc_id) else {
                return AggroTickOutcome::rejected(CombatRejection::TargetDataMissing);
            };
            let Some(profile) = self.profiles.get(&record.profile_id) else {
                return AggroTickOutcome::rejected(CombatRejection::TargetDataMissing);
            };

            let mut rng = rand::thread_rng();
            let damage = roll_damage(
                profile.stats.atk,
                player.stats.def,
                NPC_VS_PLAYER_DEF_COEFF,
                resolved.damage_variance_pct,
                &mut rng,
            );

            // Acting extends the NPC's memory of this player
            Disposition::Aggroed {
                target: req.actor_id.clone(),
                until: now + AGGRO_MEMORY_MS,
            }
            .write_to(record);
            record.clear_motion();

            (profile.display_name.clone(), damage, profile.aggression)
        };

        let hp_after = self.players.apply_damage(&req.actor_id, damage).await;
        self.players.persist(&req.actor_id).await;

        tracing::info!(
            "{} retaliates against {} on {} for {} damage (HP: {:?})",
            attacker_name,
            req.actor_id,
            req.map_name,
            damage,
            hp_after
        );

        AggroTickOutcome {
            success: true,
            reason: None,
            attacker_name: Some(attacker_name),
            damage_taken: Some(damage),
            player_hp_after: hp_after,
            resolved_aggression: Some(aggression),
        }
    }
}
