use crate::db::Db;
use crate::error::AppError;
use crate::models::item::*;
use crate::services::player;
use crate::validation;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ITEM_SELECT: &str = "SELECT i.id, i.owner_id, i.required_level, i.random_factor,
     b.id, b.name, b.description, b.item_type, b.image_path, b.base_damage, b.base_health,
     b.required_level, r.id, r.name, r.hex_color, r.multiplier, r.level_required_to_drop
     FROM equippable_items i
     JOIN equippable_item_blueprints b ON b.id = i.blueprint_id
     JOIN rarities r ON r.id = i.rarity_id";

const BLUEPRINT_COLUMNS: &str = "id, name, description, item_type, image_path, base_damage,
     base_health, required_level";

const RARITY_COLUMNS: &str = "id, name, hex_color, multiplier, level_required_to_drop";

fn blueprint_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Blueprint> {
    Ok(Blueprint {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        item_type: row.get(offset + 3)?,
        image_path: row.get(offset + 4)?,
        base_damage: row.get(offset + 5)?,
        base_health: row.get(offset + 6)?,
        required_level: row.get(offset + 7)?,
    })
}

pub fn rarity_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Rarity> {
    Ok(Rarity {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        hex_color: row.get(offset + 2)?,
        multiplier: row.get(offset + 3)?,
        level_required_to_drop: row.get(offset + 4)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<EquippableItem> {
    Ok(EquippableItem::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        blueprint_at(row, 4)?,
        rarity_at(row, 12)?,
    ))
}

pub fn fetch_item(conn: &Connection, item_id: i64) -> rusqlite::Result<Option<EquippableItem>> {
    conn.query_row(
        &format!("{} WHERE i.id = ?1", ITEM_SELECT),
        params![item_id],
        item_from_row,
    )
    .optional()
}

pub fn blueprints_for_level(conn: &Connection, level: i64) -> rusqlite::Result<Vec<Blueprint>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM equippable_item_blueprints WHERE required_level <= ?1 ORDER BY id",
        BLUEPRINT_COLUMNS
    ))?;
    let rows = stmt.query_map(params![level], |row| blueprint_at(row, 0))?;
    rows.collect()
}

fn rarities_for_level(conn: &Connection, level: i64) -> rusqlite::Result<Vec<Rarity>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM rarities WHERE level_required_to_drop <= ?1 ORDER BY id",
        RARITY_COLUMNS
    ))?;
    let rows = stmt.query_map(params![level], |row| rarity_at(row, 0))?;
    rows.collect()
}

pub fn rarity_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Rarity>> {
    conn.query_row(
        &format!("SELECT {} FROM rarities WHERE name = ?1", RARITY_COLUMNS),
        params![name],
        |row| rarity_at(row, 0),
    )
    .optional()
}

/// Materializes a new, unowned item instance of `blueprint` with the given rarity.
pub fn create_item<R: Rng + ?Sized>(
    conn: &Connection,
    blueprint: &Blueprint,
    rarity: &Rarity,
    rng: &mut R,
) -> rusqlite::Result<EquippableItem> {
    let random_factor: f64 = rng.gen_range(0.0..=2.0);
    conn.execute(
        "INSERT INTO equippable_items (blueprint_id, rarity_id, required_level, random_factor)
         VALUES (?1, ?2, ?3, ?4)",
        params![blueprint.id, rarity.id, blueprint.required_level, random_factor],
    )?;
    Ok(EquippableItem::new(
        conn.last_insert_rowid(),
        None,
        blueprint.required_level,
        random_factor,
        blueprint.clone(),
        rarity.clone(),
    ))
}

/// Hands an item to `owner_id`. Items already owned by someone else are refused.
pub fn assign_owner(
    conn: &Connection,
    item_id: i64,
    owner_id: i64,
) -> Result<EquippableItem, AppError> {
    let mut item = fetch_item(conn, item_id)?
        .ok_or_else(|| AppError::NotFound("Equippable item not found".into()))?;
    let current_owner = item.owner_id;
    match current_owner {
        Some(current) if current == owner_id => return Ok(item),
        Some(_) => {
            return Err(AppError::BadRequest(
                "Item already owned by another player".into(),
            ))
        }
        None => {}
    }
    conn.execute(
        "UPDATE equippable_items SET owner_id = ?1 WHERE id = ?2",
        params![owner_id, item_id],
    )?;
    item.owner_id = Some(owner_id);
    Ok(item)
}

pub fn list_items(db: &Db) -> Result<Vec<EquippableItem>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("{} ORDER BY i.id", ITEM_SELECT))?;
        let rows = stmt.query_map([], item_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?)
}

pub fn get_item(db: &Db, item_id: i64) -> Result<EquippableItem, AppError> {
    db.with_conn(|conn| fetch_item(conn, item_id))?
        .ok_or_else(|| AppError::NotFound("Equippable item not found".into()))
}

pub fn create_random_item(db: &Db, req: RandomItemRequest) -> Result<EquippableItem, AppError> {
    create_random_item_with(db, req, &mut rand::thread_rng())
}

fn create_random_item_with<R: Rng + ?Sized>(
    db: &Db,
    req: RandomItemRequest,
    rng: &mut R,
) -> Result<EquippableItem, AppError> {
    let level = validation::require("level", req.level)?;
    validation::validate_min("level", level, 1)?;

    db.with_transaction(|tx| {
        if let Some(owner_id) = req.owner_id {
            if player::fetch_player(tx, owner_id)?.is_none() {
                return Err(AppError::Validation("The selected ownerId is invalid.".into()));
            }
        }

        let rarities = rarities_for_level(tx, level)?;
        let blueprints = blueprints_for_level(tx, level)?;
        let (rarity, blueprint) = match (rarities.choose(rng), blueprints.choose(rng)) {
            (Some(r), Some(b)) => (r, b),
            _ => {
                return Err(AppError::BadRequest(
                    "No available rarity or blueprint for the given level".into(),
                ))
            }
        };

        let item = create_item(tx, blueprint, rarity, rng)?;
        match req.owner_id {
            Some(owner_id) => assign_owner(tx, item.id, owner_id),
            None => Ok(item),
        }
    })
}

pub fn transfer_item(
    db: &Db,
    item_id: i64,
    req: ItemTransferRequest,
) -> Result<EquippableItem, AppError> {
    let owner_id = validation::require("ownerId", req.owner_id)?;

    db.with_transaction(|tx| {
        if player::fetch_player(tx, owner_id)?.is_none() {
            return Err(AppError::Validation("The selected ownerId is invalid.".into()));
        }
        let mut item = fetch_item(tx, item_id)?
            .ok_or_else(|| AppError::NotFound("Equippable item not found".into()))?;
        tx.execute(
            "UPDATE equippable_items SET owner_id = ?1 WHERE id = ?2",
            params![owner_id, item_id],
        )?;
        // The previous owner can no longer have it equipped.
        tx.execute(
            "UPDATE players SET
                helmet_id = CASE WHEN helmet_id = ?1 THEN NULL ELSE helmet_id END,
                rune_id = CASE WHEN rune_id = ?1 THEN NULL ELSE rune_id END,
                weapon_id = CASE WHEN weapon_id = ?1 THEN NULL ELSE weapon_id END
             WHERE id IS NOT ?2",
            params![item_id, owner_id],
        )?;
        item.owner_id = Some(owner_id);
        Ok(item)
    })
}

/// Owned items of one type that are not currently equipped.
pub fn inventory(db: &Db, owner_id: i64, item_type: ItemType) -> Result<Vec<EquippableItem>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "{} JOIN players p ON p.id = i.owner_id
             WHERE i.owner_id = ?1 AND b.item_type = ?2
               AND i.id IS NOT p.helmet_id AND i.id IS NOT p.rune_id AND i.id IS NOT p.weapon_id
             ORDER BY i.id",
            ITEM_SELECT
        ))?;
        let rows = stmt.query_map(params![owner_id, item_type.code()], item_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?)
}

pub fn list_rarities(db: &Db) -> Result<Vec<Rarity>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM rarities ORDER BY id", RARITY_COLUMNS))?;
        let rows = stmt.query_map([], |row| rarity_at(row, 0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
    })?)
}
