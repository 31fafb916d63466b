use crate::db::Db;
use crate::error::AppError;
use crate::models::usable::*;
use crate::services::{item, player};
use crate::validation;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USABLE_COLUMNS: &str = "u.id, u.name, u.description, u.rarity_id, u.health_recovery,
     u.damage_amplifier, u.duration_in_seconds, u.image_path,
     r.id, r.name, r.hex_color, r.multiplier, r.level_required_to_drop";

fn usable_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<UsableItem> {
    Ok(UsableItem {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        rarity_id: row.get(offset + 3)?,
        health_recovery: row.get(offset + 4)?,
        damage_amplifier: row.get(offset + 5)?,
        duration_in_seconds: row.get(offset + 6)?,
        image_path: row.get(offset + 7)?,
        rarity: item::rarity_at(row, offset + 8)?,
    })
}

/// Catalogue entries whose rarity can drop at `level`.
fn droppable_at(conn: &Connection, level: i64) -> rusqlite::Result<Vec<UsableItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM usable_items u JOIN rarities r ON r.id = u.rarity_id
         WHERE r.level_required_to_drop <= ?1 ORDER BY u.id",
        USABLE_COLUMNS
    ))?;
    let rows = stmt.query_map(params![level], |row| usable_at(row, 0))?;
    rows.collect()
}

fn stacks_of(conn: &Connection, owner_id: i64) -> rusqlite::Result<Vec<UsableItemStack>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT s.quantity, {} FROM usable_item_stacks s
         JOIN usable_items u ON u.id = s.usable_item_id
         JOIN rarities r ON r.id = u.rarity_id
         WHERE s.owner_id = ?1 ORDER BY u.id",
        USABLE_COLUMNS
    ))?;
    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(UsableItemStack {
            quantity: row.get(0)?,
            item: usable_at(row, 1)?,
        })
    })?;
    rows.collect()
}

/// Adds one unit of `usable_item_id` to the owner's stack and returns the new quantity.
fn add_to_stack(conn: &Connection, usable_item_id: i64, owner_id: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO usable_item_stacks (usable_item_id, owner_id, quantity) VALUES (?1, ?2, 1)
         ON CONFLICT (usable_item_id, owner_id) DO UPDATE SET quantity = quantity + 1",
        params![usable_item_id, owner_id],
    )?;
    conn.query_row(
        "SELECT quantity FROM usable_item_stacks WHERE usable_item_id = ?1 AND owner_id = ?2",
        params![usable_item_id, owner_id],
        |row| row.get(0),
    )
}

pub fn list_usable_items(db: &Db) -> Result<Vec<UsableItem>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM usable_items u JOIN rarities r ON r.id = u.rarity_id ORDER BY u.id",
            USABLE_COLUMNS
        ))?;
        let rows = stmt.query_map([], |row| usable_at(row, 0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?)
}

pub fn usable_items_of(db: &Db, owner_id: i64) -> Result<Vec<UsableItemStack>, AppError> {
    let stacks = db.with_conn(|conn| {
        let exists = conn
            .query_row("SELECT 1 FROM players WHERE id = ?1", params![owner_id], |_| Ok(()))
            .optional()?;
        match exists {
            Some(()) => stacks_of(conn, owner_id).map(Some),
            None => Ok(None),
        }
    })?;
    stacks.ok_or_else(|| AppError::NotFound("Player not found".into()))
}

pub fn grant_random_usable_item(db: &Db, req: UsableItemRequest) -> Result<UsableItemGrant, AppError> {
    grant_random_usable_item_with(db, req, &mut rand::thread_rng())
}

/// Picks a random catalogue entry the owner's level can drop and adds it to their stack.
pub fn grant_random_usable_item_with<R: Rng + ?Sized>(
    db: &Db,
    req: UsableItemRequest,
    rng: &mut R,
) -> Result<UsableItemGrant, AppError> {
    let owner_id = validation::require("ownerId", req.owner_id)?;

    db.with_transaction(|tx| {
        let owner = player::fetch_player(tx, owner_id)?
            .ok_or_else(|| AppError::NotFound("Player not found".into()))?;
        let candidates = droppable_at(tx, owner.level)?;
        let picked = candidates.choose(rng).cloned().ok_or_else(|| {
            AppError::NotFound("No usable items found for the given rarity".into())
        })?;
        let quantity = add_to_stack(tx, picked.id, owner_id)?;
        log::info!(
            "Gave {} {} to player {} (now {})",
            picked.rarity.name,
            picked.name,
            owner_id,
            quantity
        );
        Ok(UsableItemGrant {
            message: "Random usable item created successfully",
            usable_item: picked,
            quantity,
        })
    })
}
