use crate::models::item::EquippableItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Battle counters the ranking is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub player_id: i64,
    pub name: String,
    pub level: i64,
    pub total_battles: u32,
    pub won_battles: u32,
}

/// One line of the computed leaderboard. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub player_id: i64,
    pub name: String,
    pub level: i64,
    /// `None` while the player has fewer than the minimum number of battles.
    pub win_rate: Option<f64>,
    pub total_battles: u32,
    pub won_battles: u32,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueRecord {
    pub player_id: i64,
    pub position: Option<u32>,
    pub registered_at: DateTime<Utc>,
    pub last_claimed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedReward {
    pub rank: u32,
    pub reward: EquippableItem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdQuery {
    pub player_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequest {
    pub player_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub message: &'static str,
    pub position: u32,
}

#[derive(Debug, Serialize)]
pub struct RewardResponse {
    pub message: &'static str,
    pub reward: EquippableItem,
}

#[derive(Debug, Serialize)]
pub struct LeagueStanding {
    pub ranking: Vec<RankedEntry>,
    pub position: Option<u32>,
}
