pub mod aggro;
pub mod damage;
pub mod engine;
pub mod loot;
pub mod settings;
pub mod target;

pub use engine::{CombatEngine, CombatRejection, RESPAWN_MS};
pub use settings::CombatSettings;
