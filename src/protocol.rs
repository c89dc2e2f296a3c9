use serde::{Deserialize, Serialize};

use crate::combat::settings::CombatSettings;
use crate::entity::Aggression;

// ============================================================================
// Inbound Requests
// ============================================================================

/// Player-initiated attack. The position is the caller's claim and is only
/// trusted for range checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRequest {
    pub actor_id: String,
    pub map_name: String,
    pub x: f32,
    pub y: f32,
}

/// Periodic hostile-counterattack resolution for one player.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggroTickRequest {
    pub actor_id: String,
    pub map_name: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub actor_id: String,
    pub name: String,
}

// ============================================================================
// Outbound Results
// ============================================================================

/// One loot drop reported back to the attacker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LootDrop {
    pub item_id: String,
    pub instance_id: String,
    pub x: f32,
    pub y: f32,
}

/// Result of a player attack. Expected game conditions come back as
/// `{success: false, reason}`; this shape never carries an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_dealt: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_taken: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_max_hp: Option<i32>,
    pub defeated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_gained: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot: Option<LootDrop>,
    /// Resolved per-map settings so the caller can self-throttle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<CombatSettings>,
}

impl AttackOutcome {
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            reason: Some(reason.to_string()),
            target_name: None,
            distance: None,
            damage_dealt: None,
            damage_taken: None,
            target_hp: None,
            target_max_hp: None,
            defeated: false,
            xp_gained: None,
            loot: None,
            settings: None,
        }
    }
}

/// Result of one hostile-counterattack resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggroTickOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attacker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_taken: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_hp_after: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_aggression: Option<Aggression>,
}

impl AggroTickOutcome {
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            success: false,
            reason: Some(reason.to_string()),
            attacker_name: None,
            damage_taken: None,
            player_hp_after: None,
            resolved_aggression: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_serializes_without_combat_fields() {
        let outcome = AttackOutcome::rejected("Combat is disabled on this map.");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["reason"], "Combat is disabled on this map.");
        assert!(json.get("targetName").is_none());
        assert!(json.get("settings").is_none());
    }

    #[test]
    fn test_request_field_names_are_camel_case() {
        let req: AttackRequest = serde_json::from_str(
            r#"{"actorId":"p1","mapName":"meadow","x":1.5,"y":2.5}"#,
        )
        .unwrap();
        assert_eq!(req.actor_id, "p1");
        assert_eq!(req.map_name, "meadow");
    }
}
