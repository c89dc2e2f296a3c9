use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

use super::prototype::{Aggression, NpcProfile, ProfileStats, RawNpcProfile};

/// Registry for all NPC profiles
pub struct ProfileRegistry {
    profiles: HashMap<String, NpcProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// Load all NPC profile definitions from `<data_dir>/npcs`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), String> {
        let npcs_dir = data_dir.join("npcs");

        // First pass: load all raw profiles
        let mut raw_profiles: HashMap<String, RawNpcProfile> = HashMap::new();
        if npcs_dir.exists() {
            self.load_toml_files(&npcs_dir, &mut raw_profiles)?;
        }

        info!("Loaded {} raw NPC profiles", raw_profiles.len());

        // Second pass: resolve inheritance
        self.resolve_all_profiles(raw_profiles)?;

        info!("Resolved {} NPC profiles", self.profiles.len());

        Ok(())
    }

    fn load_toml_files(
        &self,
        dir: &Path,
        raw_profiles: &mut HashMap<String, RawNpcProfile>,
    ) -> Result<(), String> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| format!("Failed to read directory {:?}: {}", dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "toml") {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

                // Parse as table of profiles
                let table: HashMap<String, RawNpcProfile> = toml::from_str(&content)
                    .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

                for (id, profile) in table {
                    if raw_profiles.contains_key(&id) {
                        warn!("Duplicate NPC profile '{}' in {:?}, overwriting", id, path);
                    }
                    raw_profiles.insert(id, profile);
                }
            }
        }

        Ok(())
    }

    fn resolve_all_profiles(
        &mut self,
        raw_profiles: HashMap<String, RawNpcProfile>,
    ) -> Result<(), String> {
        // Topological sort to handle inheritance order
        let sorted_ids = self.topological_sort(&raw_profiles)?;

        for id in sorted_ids {
            let raw = raw_profiles.get(&id).unwrap();
            let resolved = self.resolve_profile(&id, raw);
            self.profiles.insert(id, resolved);
        }

        Ok(())
    }

    fn topological_sort(
        &self,
        raw_profiles: &HashMap<String, RawNpcProfile>,
    ) -> Result<Vec<String>, String> {
        let mut sorted = Vec::new();
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();

        fn visit(
            id: &str,
            raw_profiles: &HashMap<String, RawNpcProfile>,
            sorted: &mut Vec<String>,
            visited: &mut HashSet<String>,
            visiting: &mut HashSet<String>,
        ) -> Result<(), String> {
            if visited.contains(id) {
                return Ok(());
            }
            if visiting.contains(id) {
                return Err(format!("Circular inheritance detected at '{}'", id));
            }

            visiting.insert(id.to_string());

            if let Some(raw) = raw_profiles.get(id) {
                if let Some(parent_id) = &raw.extends {
                    if !raw_profiles.contains_key(parent_id) {
                        return Err(format!(
                            "NPC profile '{}' extends unknown parent '{}'",
                            id, parent_id
                        ));
                    }
                    visit(parent_id, raw_profiles, sorted, visited, visiting)?;
                }
            }

            visiting.remove(id);
            visited.insert(id.to_string());
            sorted.push(id.to_string());

            Ok(())
        }

        for id in raw_profiles.keys() {
            visit(id, raw_profiles, &mut sorted, &mut visited, &mut visiting)?;
        }

        Ok(sorted)
    }

    fn resolve_profile(&self, id: &str, raw: &RawNpcProfile) -> NpcProfile {
        // Parents were resolved first by the topological sort
        let parent = raw
            .extends
            .as_ref()
            .and_then(|parent_id| self.profiles.get(parent_id));

        let defaults = ProfileStats::default();
        let max_hp = raw
            .stats
            .max_hp
            .or(raw.stats.hp)
            .or_else(|| parent.map(|p| p.stats.max_hp))
            .unwrap_or(defaults.max_hp);

        // Merge stats with parent (child overrides parent)
        let stats = ProfileStats {
            hp: raw
                .stats
                .hp
                .or_else(|| parent.map(|p| p.stats.hp))
                .unwrap_or(max_hp),
            max_hp,
            atk: raw
                .stats
                .atk
                .or_else(|| parent.map(|p| p.stats.atk))
                .unwrap_or(defaults.atk),
            def: raw
                .stats
                .def
                .or_else(|| parent.map(|p| p.stats.def))
                .unwrap_or(defaults.def),
            spd: raw
                .stats
                .spd
                .or_else(|| parent.map(|p| p.stats.spd))
                .unwrap_or(defaults.spd),
            level: raw
                .stats
                .level
                .or_else(|| parent.map(|p| p.stats.level))
                .unwrap_or(defaults.level),
        };

        // Unset or unknown aggression resolves to medium
        let aggression = raw
            .aggression
            .as_deref()
            .map(Aggression::from_str)
            .or_else(|| parent.map(|p| p.aggression))
            .unwrap_or_default();

        // Merge tags (child appends to parent)
        let mut tags: HashSet<String> = parent.map(|p| p.tags.clone()).unwrap_or_default();
        tags.extend(raw.tags.iter().cloned());

        // Merge loot tables (child appends to parent)
        let mut items = parent.map(|p| p.items.clone()).unwrap_or_default();
        items.extend(raw.items.iter().cloned());

        NpcProfile {
            id: id.to_string(),
            display_name: raw
                .display_name
                .clone()
                .or_else(|| parent.map(|p| p.display_name.clone()))
                .unwrap_or_else(|| id.to_string()),
            sprite: raw
                .sprite
                .clone()
                .or_else(|| parent.map(|p| p.sprite.clone()))
                .unwrap_or_else(|| "unknown".to_string()),
            description: raw
                .description
                .clone()
                .or_else(|| parent.map(|p| p.description.clone()))
                .unwrap_or_default(),
            stats,
            aggression,
            tags,
            items,
        }
    }

    /// Insert a resolved profile directly (map editors and tests)
    pub fn insert(&mut self, profile: NpcProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Get a profile by ID
    pub fn get(&self, id: &str) -> Option<&NpcProfile> {
        self.profiles.get(id)
    }

    /// Get the number of loaded profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
