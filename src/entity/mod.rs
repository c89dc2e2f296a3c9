pub mod prototype;
pub mod registry;

pub use prototype::{Aggression, LootEntry, NpcProfile, ProfileStats, HOSTILE_TAG};
pub use registry::ProfileRegistry;
