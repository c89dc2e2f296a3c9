use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use serde::Serialize;

// ============================================================================
// World Item (placed in the world, e.g. dropped loot)
// ============================================================================

#[derive(Debug, Clone)]
pub struct WorldItem {
    pub id: String,
    pub item_id: String,
    pub map: String,
    pub x: f32,
    pub y: f32,
    pub quantity: i32,
    /// Loot drops never respawn after pickup
    pub respawning: bool,
    pub placed_at: u64,
}

// ============================================================================
// World Item Store
// ============================================================================

/// World-placed item instances. Combat only writes here (loot drops); the
/// pickup/inventory side lives elsewhere and consumes the view below.
pub struct WorldItemStore {
    items: RwLock<HashMap<String, WorldItem>>,
}

impl WorldItemStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Place a single non-respawning item instance into the world and
    /// return it.
    pub async fn spawn(
        &self,
        map: &str,
        item_id: &str,
        x: f32,
        y: f32,
        quantity: i32,
        now: u64,
    ) -> WorldItem {
        let item = WorldItem {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            map: map.to_string(),
            x,
            y,
            quantity,
            respawning: false,
            placed_at: now,
        };
        self.items
            .write()
            .await
            .insert(item.id.clone(), item.clone());
        item
    }

    /// Snapshot of all items on one map, for collaborators.
    pub async fn items_on_map(&self, map: &str) -> Vec<WorldItemView> {
        self.items
            .read()
            .await
            .values()
            .filter(|item| item.map == map)
            .map(WorldItemView::from)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}

impl Default for WorldItemStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Item View (sent to collaborators)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldItemView {
    pub id: String,
    pub item_id: String,
    pub x: f32,
    pub y: f32,
    pub quantity: i32,
}

impl From<&WorldItem> for WorldItemView {
    fn from(item: &WorldItem) -> Self {
        Self {
            id: item.id.clone(),
            item_id: item.item_id.clone(),
            x: item.x,
            y: item.y,
            quantity: item.quantity,
        }
    }
}
