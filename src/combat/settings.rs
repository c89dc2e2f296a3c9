use serde::{Deserialize, Serialize};

// ============================================================================
// Defaults and Bounds
// ============================================================================

pub const DEFAULT_ATTACK_RANGE_PX: f64 = 64.0;
pub const ATTACK_RANGE_PX_BOUNDS: (f64, f64) = (8.0, 512.0);

pub const DEFAULT_PLAYER_ATTACK_COOLDOWN_MS: f64 = 600.0;
pub const PLAYER_ATTACK_COOLDOWN_MS_BOUNDS: (f64, f64) = (100.0, 5000.0);

pub const DEFAULT_NPC_HIT_COOLDOWN_MS: f64 = 700.0;
pub const NPC_HIT_COOLDOWN_MS_BOUNDS: (f64, f64) = (0.0, 10_000.0);

pub const DEFAULT_DAMAGE_VARIANCE_PCT: f64 = 20.0;
pub const DAMAGE_VARIANCE_PCT_BOUNDS: (f64, f64) = (0.0, 100.0);

// ============================================================================
// Raw per-map settings (possibly partially populated)
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCombatSettings {
    pub attack_range_px: Option<f64>,
    pub player_attack_cooldown_ms: Option<f64>,
    pub npc_hit_cooldown_ms: Option<f64>,
    pub damage_variance_pct: Option<f64>,
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Fully populated, clamped combat settings for one map. Returned to the
/// attack caller so the client can self-throttle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSettings {
    pub attack_range_px: f32,
    pub player_attack_cooldown_ms: u64,
    pub npc_hit_cooldown_ms: u64,
    pub damage_variance_pct: f32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        resolve(&RawCombatSettings::default())
    }
}

/// Clamp a raw value into `[min, max]`. Unset, non-finite, and out-of-bound
/// values fall back to the default rather than erroring.
fn clamp_or_default(value: Option<f64>, bounds: (f64, f64), default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(bounds.0, bounds.1),
        _ => default,
    }
}

/// Resolve a possibly partial per-map settings object into a fully
/// populated record. No side effects.
pub fn resolve(raw: &RawCombatSettings) -> CombatSettings {
    CombatSettings {
        attack_range_px: clamp_or_default(
            raw.attack_range_px,
            ATTACK_RANGE_PX_BOUNDS,
            DEFAULT_ATTACK_RANGE_PX,
        ) as f32,
        player_attack_cooldown_ms: clamp_or_default(
            raw.player_attack_cooldown_ms,
            PLAYER_ATTACK_COOLDOWN_MS_BOUNDS,
            DEFAULT_PLAYER_ATTACK_COOLDOWN_MS,
        ) as u64,
        npc_hit_cooldown_ms: clamp_or_default(
            raw.npc_hit_cooldown_ms,
            NPC_HIT_COOLDOWN_MS_BOUNDS,
            DEFAULT_NPC_HIT_COOLDOWN_MS,
        ) as u64,
        damage_variance_pct: clamp_or_default(
            raw.damage_variance_pct,
            DAMAGE_VARIANCE_PCT_BOUNDS,
            DEFAULT_DAMAGE_VARIANCE_PCT,
        ) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = resolve(&RawCombatSettings::default());
        assert_eq!(settings.attack_range_px, 64.0);
        assert_eq!(settings.player_attack_cooldown_ms, 600);
        assert_eq!(settings.npc_hit_cooldown_ms, 700);
        assert_eq!(settings.damage_variance_pct, 20.0);
    }

    #[test]
    fn test_values_clamped_to_bounds() {
        let settings = resolve(&RawCombatSettings {
            attack_range_px: Some(100_000.0),
            player_attack_cooldown_ms: Some(1.0),
            npc_hit_cooldown_ms: Some(-50.0),
            damage_variance_pct: Some(250.0),
        });
        assert_eq!(settings.attack_range_px, 512.0);
        assert_eq!(settings.player_attack_cooldown_ms, 100);
        assert_eq!(settings.npc_hit_cooldown_ms, 0);
        assert_eq!(settings.damage_variance_pct, 100.0);
    }

    #[test]
    fn test_non_finite_values_fall_back() {
        let settings = resolve(&RawCombatSettings {
            attack_range_px: Some(f64::NAN),
            player_attack_cooldown_ms: Some(f64::INFINITY),
            npc_hit_cooldown_ms: Some(f64::NEG_INFINITY),
            damage_variance_pct: None,
        });
        assert_eq!(settings.attack_range_px, 64.0);
        assert_eq!(settings.player_attack_cooldown_ms, 600);
        assert_eq!(settings.npc_hit_cooldown_ms, 700);
        assert_eq!(settings.damage_variance_pct, 20.0);
    }

    #[test]
    fn test_in_range_values_pass_through() {
        let settings = resolve(&RawCombatSettings {
            attack_range_px: Some(96.0),
            player_attack_cooldown_ms: Some(450.0),
            npc_hit_cooldown_ms: Some(0.0),
            damage_variance_pct: Some(0.0),
        });
        assert_eq!(settings.attack_range_px, 96.0);
        assert_eq!(settings.player_attack_cooldown_ms, 450);
        assert_eq!(settings.npc_hit_cooldown_ms, 0);
        assert_eq!(settings.damage_variance_pct, 0.0);
    }
}
