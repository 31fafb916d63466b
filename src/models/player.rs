use crate::models::item::EquippableItem;
use crate::models::progress::{CollectedPoi, CompletedQuest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub experience_collected: i64,
    pub n_won_battles: i64,
    pub n_battles: i64,
    pub current_health: i64,
    pub helmet_id: Option<i64>,
    pub rune_id: Option<i64>,
    pub weapon_id: Option<i64>,
}

/// A player as returned by the API: stored columns plus the stats derived from the level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    #[serde(flatten)]
    pub player: Player,
    pub experience_needed: i64,
    pub experience_to_level_up: i64,
    pub damage: i64,
    pub max_health: i64,
    pub helmet: Option<EquippableItem>,
    pub rune: Option<EquippableItem>,
    pub weapon: Option<EquippableItem>,
    pub completed_quests: Vec<CompletedQuest>,
    #[serde(rename = "collectedPOIs")]
    pub collected_pois: Vec<CollectedPoi>,
}

/// What a player has done outside of battles, embedded in [`PlayerView`].
#[derive(Debug, Default)]
pub struct PlayerProgress {
    pub completed_quests: Vec<CompletedQuest>,
    pub collected_pois: Vec<CollectedPoi>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id: i64,
    pub name: String,
    pub level: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCreateRequest {
    pub player_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdateRequest {
    pub name: Option<String>,
    pub level: Option<i64>,
    pub experience_collected: Option<i64>,
    pub n_won_battles: Option<i64>,
    pub n_battles: Option<i64>,
    pub helmet_id: Option<i64>,
    pub rune_id: Option<i64>,
    pub weapon_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PlayerMessage {
    pub message: &'static str,
    pub player: PlayerView,
}

fn linear(a: f64, b: f64, level: i64) -> i64 {
    (a * level.max(1) as f64 + b).ceil() as i64
}

pub fn damage(level: i64) -> i64 {
    linear(0.6, 1.0, level)
}

pub fn max_health(level: i64) -> i64 {
    linear(0.6, 14.0, level)
}

/// Experience required to complete `level`; levels below 1 count as 1.
pub fn experience_needed(level: i64) -> i64 {
    let l = level.max(1) as f64;
    (50.0 * l * l + 150.0 * l + 500.0 + 200.0 * 200.0 * l.ln()).ceil() as i64
}

impl PlayerView {
    pub fn new(
        player: Player,
        helmet: Option<EquippableItem>,
        rune: Option<EquippableItem>,
        weapon: Option<EquippableItem>,
        progress: PlayerProgress,
    ) -> Self {
        let experience_needed = experience_needed(player.level);
        PlayerView {
            experience_needed,
            experience_to_level_up: experience_needed - player.experience_collected,
            damage: damage(player.level),
            max_health: max_health(player.level),
            player,
            helmet,
            rune,
            weapon,
            completed_quests: progress.completed_quests,
            collected_pois: progress.collected_pois,
        }
    }
}
