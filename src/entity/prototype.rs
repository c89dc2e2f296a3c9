use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Aggression Tier
// ============================================================================

/// How an NPC reacts to being hit: flee, retaliate conditionally, or
/// retaliate unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggression {
    Low,
    Medium,
    High,
}

impl Default for Aggression {
    fn default() -> Self {
        Aggression::Medium
    }
}

impl Aggression {
    /// Unknown or missing tiers resolve to Medium.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Aggression::Low,
            "medium" => Aggression::Medium,
            "high" => Aggression::High,
            _ => Aggression::Medium,
        }
    }

}

/// Tag that marks a profile as attackable and able to aggro.
pub const HOSTILE_TAG: &str = "hostile";

// ============================================================================
// Raw TOML Structures (direct deserialization)
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProfileStats {
    pub hp: Option<i32>,
    pub max_hp: Option<i32>,
    pub atk: Option<i32>,
    pub def: Option<i32>,
    pub spd: Option<i32>,
    pub level: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LootEntry {
    pub item_id: String,
    #[serde(default = "default_one")]
    pub quantity: i32,
}

fn default_one() -> i32 {
    1
}

/// Raw NPC profile as loaded directly from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawNpcProfile {
    pub extends: Option<String>,

    pub display_name: Option<String>,
    pub sprite: Option<String>,
    pub description: Option<String>,
    /// Free-form aggression string; anything unknown falls back to medium
    pub aggression: Option<String>,

    #[serde(default)]
    pub stats: RawProfileStats,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub items: Vec<LootEntry>,
}

// ============================================================================
// Resolved Structures (after inheritance)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProfileStats {
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub def: i32,
    pub spd: i32,
    pub level: i32,
}

impl Default for ProfileStats {
    fn default() -> Self {
        Self {
            hp: 20,
            max_hp: 20,
            atk: 5,
            def: 1,
            spd: 3,
            level: 1,
        }
    }
}

/// Fully resolved NPC profile (after inheritance resolution). Immutable
/// during combat; live per-instance state lives in `NpcCombatRecord`.
#[derive(Debug, Clone)]
pub struct NpcProfile {
    pub id: String,
    pub display_name: String,
    pub sprite: String,
    pub description: String,

    pub stats: ProfileStats,
    pub aggression: Aggression,
    pub tags: HashSet<String>,
    /// Ordered loot table; the first entry with positive quantity is the
    /// single eligible drop on defeat.
    pub items: Vec<LootEntry>,
}

impl NpcProfile {
    /// Hostile profiles can be attacked and can aggro.
    pub fn is_hostile(&self) -> bool {
        self.tags.contains(HOSTILE_TAG)
    }

    /// First loot entry with a positive quantity, if any.
    pub fn eligible_drop(&self) -> Option<&LootEntry> {
        self.items.iter().find(|entry| entry.quantity > 0)
    }
}
