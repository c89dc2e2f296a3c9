use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::entity::ProfileRegistry;
use crate::map::MapDefinition;
use crate::npc::{NpcCombatRecord, NpcView};

// ============================================================================
// Map Instance
// ============================================================================

/// Live state for one map: the authoritative NPC combat records.
///
/// Each combat resolution takes the write lock once and performs its whole
/// read-modify-write under it, so concurrent attacks against one NPC always
/// see each other's writes.
pub struct MapInstance {
    pub map_id: String,
    pub npcs: RwLock<HashMap<String, NpcCombatRecord>>,
}

impl MapInstance {
    /// Snapshot views for rendering/movement collaborators.
    pub async fn npc_views(&self, profiles: &ProfileRegistry) -> Vec<NpcView> {
        let npcs = self.npcs.read().await;
        npcs.values()
            .filter_map(|record| {
                profiles
                    .get(&record.profile_id)
                    .map(|profile| NpcView::new(record, profile))
            })
            .collect()
    }
}

// ============================================================================
// World State
// ============================================================================

/// All live map instances. Instances are created lazily, spawning their NPC
/// records from the map definition on first use.
pub struct WorldState {
    instances: DashMap<String, Arc<MapInstance>>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }

    pub fn get(&self, map_id: &str) -> Option<Arc<MapInstance>> {
        self.instances.get(map_id).map(|entry| entry.clone())
    }

    /// Get the instance for a map, spawning its NPCs from the definition if
    /// this is the first use.
    pub fn get_or_spawn(
        &self,
        map_id: &str,
        definition: &MapDefinition,
        profiles: &ProfileRegistry,
    ) -> Arc<MapInstance> {
        if let Some(instance) = self.instances.get(map_id) {
            return instance.clone();
        }

        let mut npcs = HashMap::new();
        for (i, spawn) in definition.spawns.iter().enumerate() {
            let npc_id = format!("{}_{}_{}", map_id, spawn.profile, i);
            match profiles.get(&spawn.profile) {
                Some(profile) => {
                    let record =
                        NpcCombatRecord::from_profile(&npc_id, map_id, profile, spawn.x, spawn.y);
                    npcs.insert(npc_id, record);
                }
                None => {
                    warn!(
                        "Profile '{}' not found for spawn on map {}",
                        spawn.profile, map_id
                    );
                }
            }
        }

        let spawned = npcs.len();
        let instance = Arc::new(MapInstance {
            map_id: map_id.to_string(),
            npcs: RwLock::new(npcs),
        });
        self.instances.insert(map_id.to_string(), instance.clone());
        info!("Created map instance {} with {} NPCs", map_id, spawned);
        instance
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::settings::RawCombatSettings;
    use crate::entity::{Aggression, NpcProfile, ProfileStats, HOSTILE_TAG};
    use crate::map::NpcSpawn;
    use std::collections::HashSet;

    fn slime_profile() -> NpcProfile {
        NpcProfile {
            id: "slime".to_string(),
            display_name: "Slime".to_string(),
            sprite: "slime".to_string(),
            description: String::new(),
            stats: ProfileStats::default(),
            aggression: Aggression::Medium,
            tags: HashSet::from([HOSTILE_TAG.to_string()]),
            items: vec![],
        }
    }

    fn definition() -> MapDefinition {
        MapDefinition {
            display_name: Some("Meadow".to_string()),
            combat_enabled: true,
            combat: RawCombatSettings::default(),
            spawns: vec![
                NpcSpawn { profile: "slime".to_string(), x: 10.0, y: 10.0 },
                NpcSpawn { profile: "ghost".to_string(), x: 20.0, y: 20.0 },
            ],
        }
    }

    #[tokio::test]
    async fn test_spawns_known_profiles_once() {
        let mut profiles = ProfileRegistry::new();
        profiles.insert(slime_profile());

        let world = WorldState::new();
        let instance = world.get_or_spawn("meadow", &definition(), &profiles);
        // Unknown 'ghost' spawn is skipped
        assert_eq!(instance.npcs.read().await.len(), 1);

        // Second call returns the same instance, not a respawn
        {
            let mut npcs = instance.npcs.write().await;
            npcs.values_mut().next().unwrap().current_hp = 3;
        }
        let again = world.get_or_spawn("meadow", &definition(), &profiles);
        assert_eq!(again.npcs.read().await.values().next().unwrap().current_hp, 3);
    }
}
