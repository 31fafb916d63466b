//! Completed quests and collected points of interest.

use crate::db::Db;
use crate::error::AppError;
use crate::models::progress::*;
use crate::validation;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const MAX_QUEST_NAME_LEN: usize = 255;

fn quest_from_row(row: &Row<'_>) -> rusqlite::Result<CompletedQuest> {
    Ok(CompletedQuest {
        id: row.get(0)?,
        player_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn poi_from_row(row: &Row<'_>) -> rusqlite::Result<CollectedPoi> {
    Ok(CollectedPoi {
        id: row.get(0)?,
        player_id: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn quests_for(conn: &Connection, player_id: i64) -> rusqlite::Result<Vec<CompletedQuest>> {
    let mut stmt = conn.prepare(
        "SELECT id, player_id, name, created_at, updated_at
         FROM completed_quests WHERE player_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![player_id], quest_from_row)?;
    rows.collect()
}

pub fn pois_for(conn: &Connection, player_id: i64) -> rusqlite::Result<Vec<CollectedPoi>> {
    let mut stmt = conn.prepare(
        "SELECT id, player_id, latitude, longitude, created_at, updated_at
         FROM collected_pois WHERE player_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![player_id], poi_from_row)?;
    rows.collect()
}

pub fn completed_quests(db: &Db, player_id: i64) -> Result<Vec<CompletedQuest>, AppError> {
    validation::validate_existing_player(db, "playerId", player_id)?;
    Ok(db.with_conn(|conn| quests_for(conn, player_id))?)
}

pub fn record_quest(db: &Db, req: QuestRequest) -> Result<CompletedQuest, AppError> {
    record_quest_at(db, req, Utc::now())
}

pub fn record_quest_at(
    db: &Db,
    req: QuestRequest,
    now: DateTime<Utc>,
) -> Result<CompletedQuest, AppError> {
    let player_id = validation::require("playerId", req.player_id)?;
    let name = validation::require("name", req.name.as_deref())?;
    let name = validation::validate_text("name", name, MAX_QUEST_NAME_LEN)?;
    validation::validate_existing_player(db, "playerId", player_id)?;

    let quest = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO completed_quests (player_id, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![player_id, name, now],
        )?;
        conn.query_row(
            "SELECT id, player_id, name, created_at, updated_at
             FROM completed_quests WHERE id = ?1",
            params![conn.last_insert_rowid()],
            quest_from_row,
        )
    })?;
    log::info!("Player {} completed quest {:?}", player_id, quest.name);
    Ok(quest)
}

pub fn collected_pois(db: &Db, player_id: i64) -> Result<Vec<CollectedPoi>, AppError> {
    validation::validate_existing_player(db, "playerId", player_id)?;
    Ok(db.with_conn(|conn| pois_for(conn, player_id))?)
}

pub fn collect_poi(db: &Db, req: PoiRequest) -> Result<CollectedPoi, AppError> {
    collect_poi_at(db, req, Utc::now())
}

/// Records a visit. A player visiting the same coordinates again refreshes the existing row.
pub fn collect_poi_at(
    db: &Db,
    req: PoiRequest,
    now: DateTime<Utc>,
) -> Result<CollectedPoi, AppError> {
    let player_id = validation::require("playerId", req.player_id)?;
    let latitude = validation::require("latitude", req.latitude)?;
    let longitude = validation::require("longitude", req.longitude)?;
    validation::validate_coordinate("latitude", latitude, 90.0)?;
    validation::validate_coordinate("longitude", longitude, 180.0)?;
    validation::validate_existing_player(db, "playerId", player_id)?;

    let poi = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO collected_pois (player_id, latitude, longitude, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT (player_id, latitude, longitude) DO UPDATE SET updated_at = excluded.updated_at",
            params![player_id, latitude, longitude, now],
        )?;
        conn.query_row(
            "SELECT id, player_id, latitude, longitude, created_at, updated_at
             FROM collected_pois WHERE player_id = ?1 AND latitude = ?2 AND longitude = ?3",
            params![player_id, latitude, longitude],
            poi_from_row,
        )
    })?;
    log::debug!(
        "Player {} collected POI {} at ({}, {})",
        player_id,
        poi.id,
        latitude,
        longitude
    );
    Ok(poi)
}
