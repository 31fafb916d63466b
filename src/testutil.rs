use crate::db::Db;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::params;

/// Noon UTC on the given day.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn insert_player(db: &Db, name: &str, level: i64, battles: i64, won: i64) -> i64 {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO players (name, level, n_battles, n_won_battles) VALUES (?1, ?2, ?3, ?4)",
            params![name, level, battles, won],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .unwrap()
}

pub fn insert_item(db: &Db, blueprint: &str, rarity: &str, owner: Option<i64>) -> i64 {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO equippable_items (blueprint_id, rarity_id, required_level, owner_id)
             SELECT b.id, r.id, b.required_level, ?3
             FROM equippable_item_blueprints b, rarities r
             WHERE b.name = ?1 AND r.name = ?2",
            params![blueprint, rarity, owner],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .unwrap()
}

pub fn insert_league_record(
    db: &Db,
    player_id: i64,
    registered_at: DateTime<Utc>,
    last_claimed_at: Option<DateTime<Utc>>,
) {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO league (player_id, registered_at, last_claimed_at) VALUES (?1, ?2, ?3)",
            params![player_id, registered_at, last_claimed_at],
        )
    })
    .unwrap();
}

pub fn count_items(db: &Db, owner_id: i64) -> i64 {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM equippable_items WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )
    })
    .unwrap()
}
