use crate::db::Db;
use crate::error::AppError;
use crate::models::player::PlayerSummary;
use crate::services::player;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::params;

/// How far an opponent's level may differ from the requester's.
pub const LEVEL_BAND: i64 = 2;

pub fn find_opponent(db: &Db, player_id: i64) -> Result<Option<PlayerSummary>, AppError> {
    find_opponent_with(db, player_id, &mut rand::thread_rng())
}

/// A random other player within the level band, or `None` when nobody qualifies.
pub fn find_opponent_with<R: Rng + ?Sized>(
    db: &Db,
    player_id: i64,
    rng: &mut R,
) -> Result<Option<PlayerSummary>, AppError> {
    let lookup = db.with_conn(|conn| {
        let Some(requester) = player::fetch_player(conn, player_id)? else {
            return Ok(None);
        };
        let mut stmt = conn.prepare(
            "SELECT id, name, level FROM players
             WHERE id != ?1 AND level BETWEEN ?2 AND ?3
             ORDER BY id",
        )?;
        let rows = stmt.query_map(
            params![
                player_id,
                requester.level.saturating_sub(LEVEL_BAND),
                requester.level.saturating_add(LEVEL_BAND)
            ],
            |row| {
                Ok(PlayerSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    level: row.get(2)?,
                })
            },
        )?;
        let candidates = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(candidates))
    })?;

    let candidates = lookup.ok_or_else(|| AppError::NotFound("Player not found".into()))?;
    let opponent = candidates.choose(rng).cloned();
    match &opponent {
        Some(o) => log::debug!("Matched player {} against {}", player_id, o.id),
        None => log::debug!("No opponent within level band for player {}", player_id),
    }
    Ok(opponent)
}
