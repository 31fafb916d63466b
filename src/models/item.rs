use serde::{Deserialize, Serialize};

/// Equip slot an item blueprint fits into. Stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Weapon = 1,
    Armor = 2,
    Rune = 3,
}

impl ItemType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ItemType::Weapon),
            2 => Some(ItemType::Armor),
            3 => Some(ItemType::Rune),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rarity {
    pub id: i64,
    pub name: String,
    pub hex_color: String,
    pub multiplier: f64,
    pub level_required_to_drop: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: i64,
    pub image_path: String,
    pub base_damage: i64,
    pub base_health: i64,
    pub required_level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippableItem {
    pub id: i64,
    pub blueprint_id: i64,
    pub rarity_id: i64,
    pub owner_id: Option<i64>,
    pub required_level: i64,
    #[serde(skip)]
    pub random_factor: f64,
    pub damage: f64,
    pub health: f64,
    pub blueprint: Blueprint,
    pub rarity: Rarity,
}

impl EquippableItem {
    pub fn new(
        id: i64,
        owner_id: Option<i64>,
        required_level: i64,
        random_factor: f64,
        blueprint: Blueprint,
        rarity: Rarity,
    ) -> Self {
        let scaled = |base: i64| (base as f64 + random_factor) * rarity.multiplier;
        EquippableItem {
            id,
            blueprint_id: blueprint.id,
            rarity_id: rarity.id,
            owner_id,
            required_level,
            random_factor,
            damage: scaled(blueprint.base_damage),
            health: scaled(blueprint.base_health),
            blueprint,
            rarity,
        }
    }

    pub fn item_type(&self) -> Option<ItemType> {
        ItemType::from_code(self.blueprint.item_type)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomItemRequest {
    pub level: Option<i64>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTransferRequest {
    pub owner_id: Option<i64>,
}

/// Query values arrive as strings so malformed numbers become validation errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    pub owner_id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}
