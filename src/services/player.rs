use crate::db::Db;
use crate::error::AppError;
use crate::models::item::ItemType;
use crate::models::player::*;
use crate::services::{item, progress};
use crate::validation;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PLAYER_COLUMNS: &str = "id, name, level, experience_collected, n_won_battles, n_battles,
     current_health, helmet_id, rune_id, weapon_id";

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        level: row.get(2)?,
        experience_collected: row.get(3)?,
        n_won_battles: row.get(4)?,
        n_battles: row.get(5)?,
        current_health: row.get(6)?,
        helmet_id: row.get(7)?,
        rune_id: row.get(8)?,
        weapon_id: row.get(9)?,
    })
}

pub fn fetch_player(conn: &Connection, player_id: i64) -> rusqlite::Result<Option<Player>> {
    conn.query_row(
        &format!("SELECT {} FROM players WHERE id = ?1", PLAYER_COLUMNS),
        params![player_id],
        player_from_row,
    )
    .optional()
}

fn name_taken(conn: &Connection, name: &str, except: Option<i64>) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM players WHERE name = ?1 AND id IS NOT ?2",
        params![name, except],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn view(conn: &Connection, player: Player) -> Result<PlayerView, AppError> {
    let slot = |id: Option<i64>| -> Result<_, AppError> {
        Ok(match id {
            Some(id) => item::fetch_item(conn, id)?,
            None => None,
        })
    };
    let helmet = slot(player.helmet_id)?;
    let rune = slot(player.rune_id)?;
    let weapon = slot(player.weapon_id)?;
    let activity = PlayerProgress {
        completed_quests: progress::quests_for(conn, player.id)?,
        collected_pois: progress::pois_for(conn, player.id)?,
    };
    Ok(PlayerView::new(player, helmet, rune, weapon, activity))
}

pub fn create_player(db: &Db, req: PlayerCreateRequest) -> Result<PlayerView, AppError> {
    let name = validation::require("playerName", req.player_name.as_deref())?;
    let name = validation::validate_player_name(name)?;

    db.with_transaction(|tx| {
        if name_taken(tx, &name, None)? {
            return Err(AppError::Validation(
                "The player name has already been taken.".into(),
            ));
        }
        tx.execute("INSERT INTO players (name) VALUES (?1)", params![name])?;
        let id = tx.last_insert_rowid();
        log::info!("Created player {} ({})", id, name);
        let player = fetch_player(tx, id)?
            .ok_or_else(|| AppError::NotFound("Player not found".into()))?;
        view(tx, player)
    })
}

pub fn list_players(db: &Db) -> Result<Vec<PlayerView>, AppError> {
    let players = db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM players ORDER BY id",
            PLAYER_COLUMNS
        ))?;
        let rows = stmt.query_map([], player_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?;

    db.with_transaction(|tx| players.into_iter().map(|p| view(tx, p)).collect())
}

pub fn get_player(db: &Db, player_id: i64) -> Result<PlayerView, AppError> {
    db.with_transaction(|tx| {
        let player = fetch_player(tx, player_id)?
            .ok_or_else(|| AppError::NotFound("Player not found".into()))?;
        view(tx, player)
    })
}

/// Checks that `item_id` can go into `slot` for `player_id`, claiming it when unowned.
fn equip(
    conn: &Connection,
    player_id: i64,
    item_id: i64,
    slot: ItemType,
) -> Result<(), AppError> {
    let found = item::fetch_item(conn, item_id)?.ok_or_else(|| {
        AppError::Validation(format!("The selected item {} is invalid.", item_id))
    })?;

    let wrong_owner = found.owner_id.map_or(false, |owner| owner != player_id);
    if wrong_owner || found.item_type() != Some(slot) {
        let what = match slot {
            ItemType::Armor => "Helmet already owned by another player or the item is not an helmet",
            ItemType::Rune => "Rune already owned by another player or the item is not a rune",
            ItemType::Weapon => "Weapon already owned by another player or the item is not a weapon",
        };
        return Err(AppError::BadRequest(what.into()));
    }

    if found.owner_id.is_none() {
        item::assign_owner(conn, item_id, player_id)?;
    }
    Ok(())
}

pub fn update_player(
    db: &Db,
    player_id: i64,
    req: PlayerUpdateRequest,
) -> Result<PlayerView, AppError> {
    for (field, value, min) in [
        ("level", req.level, 1),
        ("experienceCollected", req.experience_collected, 0),
        ("nWonBattles", req.n_won_battles, 0),
        ("nBattles", req.n_battles, 0),
    ] {
        if let Some(v) = value {
            validation::validate_min(field, v, min)?;
            validation::validate_max(field, v, validation::MAX_STORED_INT)?;
        }
    }
    let name = req
        .name
        .as_deref()
        .map(validation::validate_player_name)
        .transpose()?;

    db.with_transaction(|tx| {
        let mut player = fetch_player(tx, player_id)?
            .ok_or_else(|| AppError::NotFound("Player not found".into()))?;

        if let Some(name) = name {
            if name_taken(tx, &name, Some(player_id))? {
                return Err(AppError::Validation(
                    "The name has already been taken.".into(),
                ));
            }
            player.name = name;
        }
        player.level = req.level.unwrap_or(player.level);
        player.experience_collected = req
            .experience_collected
            .unwrap_or(player.experience_collected);
        player.n_won_battles = req.n_won_battles.unwrap_or(player.n_won_battles);
        player.n_battles = req.n_battles.unwrap_or(player.n_battles);
        if player.n_won_battles > player.n_battles {
            return Err(AppError::Validation(
                "The nWonBattles field may not exceed nBattles.".into(),
            ));
        }

        for (slot, requested, current) in [
            (ItemType::Armor, req.helmet_id, &mut player.helmet_id),
            (ItemType::Rune, req.rune_id, &mut player.rune_id),
            (ItemType::Weapon, req.weapon_id, &mut player.weapon_id),
        ] {
            if let Some(item_id) = requested {
                equip(tx, player_id, item_id, slot)?;
                *current = Some(item_id);
            }
        }

        tx.execute(
            "UPDATE players SET name = ?1, level = ?2, experience_collected = ?3,
             n_won_battles = ?4, n_battles = ?5, helmet_id = ?6, rune_id = ?7, weapon_id = ?8
             WHERE id = ?9",
            params![
                player.name,
                player.level,
                player.experience_collected,
                player.n_won_battles,
                player.n_battles,
                player.helmet_id,
                player.rune_id,
                player.weapon_id,
                player_id,
            ],
        )?;
        view(tx, player)
    })
}

pub fn delete_player(db: &Db, player_id: i64) -> Result<(), AppError> {
    let deleted = db.with_conn(|conn| {
        conn.execute("DELETE FROM players WHERE id = ?1", params![player_id])
    })?;
    if deleted == 0 {
        return Err(AppError::NotFound("Player not found".into()));
    }
    log::info!("Deleted player {}", player_id);
    Ok(())
}
