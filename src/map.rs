use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use serde::Deserialize;

use crate::combat::settings::RawCombatSettings;

// ============================================================================
// Map Definition
// ============================================================================

/// One NPC placement on a map.
#[derive(Debug, Clone, Deserialize)]
pub struct NpcSpawn {
    pub profile: String,
    pub x: f32,
    pub y: f32,
}

/// Per-map configuration as loaded from TOML. Combat settings may be
/// partially populated; the resolver fills the gaps.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDefinition {
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub combat_enabled: bool,
    #[serde(default)]
    pub combat: RawCombatSettings,
    #[serde(default)]
    pub spawns: Vec<NpcSpawn>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Map Registry
// ============================================================================

/// Registry of all map definitions, keyed by map name.
pub struct MapRegistry {
    maps: HashMap<String, MapDefinition>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self {
            maps: HashMap::new(),
        }
    }

    /// Load all map definitions from `<data_dir>/maps`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), String> {
        let maps_dir = data_dir.join("maps");
        if !maps_dir.exists() {
            warn!("Map directory {:?} does not exist", maps_dir);
            return Ok(());
        }

        let entries = std::fs::read_dir(&maps_dir)
            .map_err(|e| format!("Failed to read directory {:?}: {}", maps_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "toml") {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

                let table: HashMap<String, MapDefinition> = toml::from_str(&content)
                    .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

                for (name, definition) in table {
                    if self.maps.contains_key(&name) {
                        warn!("Duplicate map '{}' in {:?}, overwriting", name, path);
                    }
                    self.maps.insert(name, definition);
                }
            }
        }

        info!("Loaded {} map definitions", self.maps.len());
        Ok(())
    }

    /// Insert a definition directly (tests and tooling).
    pub fn insert(&mut self, name: &str, definition: MapDefinition) {
        self.maps.insert(name.to_string(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&MapDefinition> {
        self.maps.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.maps.keys()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }
}

impl Default for MapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_map_toml() -> &'static str {
        r#"
[meadow]
display_name = "Meadow"
combat_enabled = true

[meadow.combat]
attack_range_px = 96.0
damage_variance_pct = 0.0

[[meadow.spawns]]
profile = "slime"
x = 200.0
y = 160.0

[[meadow.spawns]]
profile = "wolf"
x = 400.0
y = 80.0

[sanctuary]
display_name = "Sanctuary"
combat_enabled = false
"#
    }

    #[test]
    fn test_load_maps() {
        let temp_dir = TempDir::new().unwrap();
        let maps_dir = temp_dir.path().join("maps");
        std::fs::create_dir_all(&maps_dir).unwrap();
        std::fs::write(maps_dir.join("maps.toml"), create_test_map_toml()).unwrap();

        let mut registry = MapRegistry::new();
        registry.load_from_directory(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), 2);

        let meadow = registry.get("meadow").unwrap();
        assert!(meadow.combat_enabled);
        assert_eq!(meadow.combat.attack_range_px, Some(96.0));
        assert_eq!(meadow.spawns.len(), 2);
        assert_eq!(meadow.spawns[0].profile, "slime");

        let sanctuary = registry.get("sanctuary").unwrap();
        assert!(!sanctuary.combat_enabled);
        // Unset settings stay unset until resolution
        assert!(sanctuary.combat.attack_range_px.is_none());
        assert!(sanctuary.spawns.is_empty());
    }
}
