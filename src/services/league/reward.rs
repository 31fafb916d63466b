use crate::error::{AppError, LeagueError};
use crate::models::item::EquippableItem;
use crate::services::{item, player};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTier {
    Legendary,
    Epic,
    Rare,
    Common,
}

impl RewardTier {
    pub fn for_rank(rank: u32) -> Self {
        match rank {
            1 => RewardTier::Legendary,
            2 | 3 => RewardTier::Epic,
            4..=20 => RewardTier::Rare,
            _ => RewardTier::Common,
        }
    }

    /// Name of the rarity row this tier draws from.
    pub fn rarity_name(self) -> &'static str {
        match self {
            RewardTier::Legendary => "Legendary",
            RewardTier::Epic => "Epic",
            RewardTier::Rare => "Rare",
            RewardTier::Common => "Common",
        }
    }
}

/// Creates the weekly reward for a player at `rank` and hands it to them.
pub fn generate<R: Rng + ?Sized>(
    conn: &Connection,
    rank: u32,
    player_id: i64,
    rng: &mut R,
) -> Result<EquippableItem, AppError> {
    let player = player::fetch_player(conn, player_id)?
        .ok_or_else(|| AppError::NotFound("Player not found".into()))?;

    let blueprints = item::blueprints_for_level(conn, player.level)?;
    let blueprint = blueprints
        .choose(rng)
        .ok_or(LeagueError::NoEligibleBlueprint(player.level))?;

    let tier = RewardTier::for_rank(rank);
    let rarity = item::rarity_by_name(conn, tier.rarity_name())?
        .ok_or(LeagueError::RarityNotConfigured(tier.rarity_name()))?;

    let created = item::create_item(conn, blueprint, &rarity, rng)?;
    let reward = item::assign_owner(conn, created.id, player_id)?;
    log::debug!(
        "Granted {} {} (item {}) to player {} at rank {}",
        rarity.name,
        blueprint.name,
        reward.id,
        player_id,
        rank
    );
    Ok(reward)
}
