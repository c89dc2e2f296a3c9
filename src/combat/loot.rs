//! Defeat rewards: experience for the attacker and at most one loot drop.

use crate::entity::NpcProfile;
use crate::item::{WorldItem, WorldItemStore};

/// Experience granted per NPC level on defeat.
pub const XP_PER_LEVEL: i64 = 8;

/// Experience for defeating an NPC of the given level.
pub fn xp_reward(level: i32) -> i64 {
    i64::from(level.max(0)) * XP_PER_LEVEL
}

/// Spawn the defeated NPC's drop, if it carries one: the first loot entry
/// with positive quantity becomes a single world-placed instance of
/// quantity 1 at the NPC's last position. Never more than one item per
/// defeat, regardless of loot-table size.
pub async fn spawn_drop(
    items: &WorldItemStore,
    profile: &NpcProfile,
    map: &str,
    x: f32,
    y: f32,
    now: u64,
) -> Option<WorldItem> {
    let entry = profile.eligible_drop()?;
    let item = items.spawn(map, &entry.item_id, x, y, 1, now).await;
    Some(item)
}
