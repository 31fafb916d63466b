use crate::models::item::Rarity;
use serde::{Deserialize, Serialize};

/// A consumable from the shared catalogue. Players hold stacks of these rather than instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsableItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub rarity_id: i64,
    pub health_recovery: i64,
    pub damage_amplifier: i64,
    pub duration_in_seconds: i64,
    pub image_path: String,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsableItemStack {
    #[serde(flatten)]
    pub item: UsableItem,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsableItemRequest {
    pub owner_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub owner_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsableItemGrant {
    pub message: &'static str,
    pub usable_item: UsableItem,
    pub quantity: i64,
}
