//! Weekly reward claims.
//!
//! A player's league record moves from "no record" to "registered" on first contact and from
//! there on to "claimed at T". Checks and claims share one evaluation so a claim re-validates
//! the window inside the same transaction that writes it.

use crate::db::Db;
use crate::error::{AppError, LeagueError};
use crate::models::league::{ClaimedReward, LeagueRecord};
use crate::services::league::{ranking, reward, week};
use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

enum Gate {
    Eligible(u32),
    Blocked(LeagueError),
}

pub fn fetch_record(conn: &Connection, player_id: i64) -> rusqlite::Result<Option<LeagueRecord>> {
    conn.query_row(
        "SELECT player_id, position, registered_at, last_claimed_at
         FROM league WHERE player_id = ?1",
        params![player_id],
        |row| {
            Ok(LeagueRecord {
                player_id: row.get(0)?,
                position: row.get(1)?,
                registered_at: row.get(2)?,
                last_claimed_at: row.get(3)?,
            })
        },
    )
    .optional()
}

fn evaluate(conn: &Connection, player_id: i64, now: DateTime<Utc>) -> Result<Gate, AppError> {
    let Some(rank) = ranking::rank_of(conn, player_id)? else {
        return Ok(Gate::Blocked(LeagueError::InsufficientBattles));
    };

    let Some(record) = fetch_record(conn, player_id)? else {
        conn.execute(
            "INSERT INTO league (player_id, position, registered_at) VALUES (?1, ?2, ?3)",
            params![player_id, rank, now],
        )?;
        log::info!("Registered player {} in the league at rank {}", player_id, rank);
        return Ok(Gate::Blocked(LeagueError::NotYetEligible));
    };

    if record.position != Some(rank) {
        log::debug!(
            "Player {} moved from {:?} to rank {}",
            record.player_id,
            record.position,
            rank
        );
        conn.execute(
            "UPDATE league SET position = ?1 WHERE player_id = ?2",
            params![rank, player_id],
        )?;
    }

    Ok(match record.last_claimed_at {
        Some(claimed) if week::same_claim_window(claimed, now) => {
            Gate::Blocked(LeagueError::AlreadyClaimed)
        }
        None if week::same_claim_window(record.registered_at, now) => {
            Gate::Blocked(LeagueError::NotYetEligible)
        }
        _ => Gate::Eligible(rank),
    })
}

/// Returns the player's rank when a reward can be claimed right now.
pub fn check_eligibility(db: &Db, player_id: i64) -> Result<u32, AppError> {
    check_eligibility_at(db, player_id, Utc::now())
}

pub fn check_eligibility_at(
    db: &Db,
    player_id: i64,
    now: DateTime<Utc>,
) -> Result<u32, AppError> {
    // Blocked outcomes still commit: first contact registers the player.
    let gate = db.with_transaction(|tx| evaluate(tx, player_id, now))?;
    match gate {
        Gate::Eligible(rank) => Ok(rank),
        Gate::Blocked(reason) => Err(reason.into()),
    }
}

pub fn claim(db: &Db, player_id: i64) -> Result<ClaimedReward, AppError> {
    claim_at(db, player_id, Utc::now(), &mut rand::thread_rng())
}

/// Marks this week's reward as claimed and generates it, all in one transaction.
pub fn claim_at<R: Rng + ?Sized>(
    db: &Db,
    player_id: i64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ClaimedReward, AppError> {
    let outcome = db.with_transaction(|tx| {
        let rank = match evaluate(tx, player_id, now)? {
            Gate::Eligible(rank) => rank,
            Gate::Blocked(reason) => return Ok(Err(reason)),
        };
        tx.execute(
            "UPDATE league SET last_claimed_at = ?1 WHERE player_id = ?2",
            params![now, player_id],
        )?;
        let reward = reward::generate(tx, rank, player_id, rng)?;
        Ok(Ok(ClaimedReward { rank, reward }))
    })?;

    match &outcome {
        Ok(claimed) => log::info!("Player {} claimed the reward for rank {}", player_id, claimed.rank),
        Err(reason) => log::info!("Refused reward claim for player {}: {}", player_id, reason),
    }
    outcome.map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, at};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn league_error(result: Result<impl std::fmt::Debug, AppError>) -> LeagueError {
        match result {
            Err(AppError::League(e)) => e,
            other => panic!("expected a league error, got {:?}", other),
        }
    }

    #[test]
    fn test_insufficient_battles() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Rookie", 1, 9, 9);
        let now = at(2025, 3, 5);

        assert_eq!(
            league_error(check_eligibility_at(&db, id, now)),
            LeagueError::InsufficientBattles
        );
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            league_error(claim_at(&db, id, now, &mut rng)),
            LeagueError::InsufficientBattles
        );
        assert!(db.with_conn(|c| fetch_record(c, id)).unwrap().is_none());
    }

    #[test]
    fn test_unknown_player() {
        let db = Db::open_in_memory().unwrap();
        assert!(matches!(
            check_eligibility_at(&db, 8, at(2025, 3, 5)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_first_check_registers_and_waits_a_week() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Aria", 1, 12, 8);
        let monday = at(2025, 3, 3);

        assert_eq!(
            league_error(check_eligibility_at(&db, id, monday)),
            LeagueError::NotYetEligible
        );
        let record = db.with_conn(|c| fetch_record(c, id)).unwrap().unwrap();
        assert_eq!(record.registered_at, monday);
        assert_eq!(record.last_claimed_at, None);
        assert_eq!(record.position, Some(1));

        assert_eq!(
            league_error(check_eligibility_at(&db, id, monday + Duration::days(3))),
            LeagueError::NotYetEligible
        );
        assert_eq!(
            check_eligibility_at(&db, id, monday + Duration::days(7)).unwrap(),
            1
        );
    }

    #[test]
    fn test_claim_without_record_registers_instead_of_granting() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Aria", 1, 12, 8);
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(
            league_error(claim_at(&db, id, at(2025, 3, 5), &mut rng)),
            LeagueError::NotYetEligible
        );
        assert!(db.with_conn(|c| fetch_record(c, id)).unwrap().is_some());
        assert_eq!(testutil::count_items(&db, id), 0);
    }

    #[test]
    fn test_claim_then_already_claimed_until_next_week() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Aria", 5, 12, 8);
        testutil::insert_player(&db, "Bram", 5, 20, 10);
        testutil::insert_league_record(&db, id, at(2025, 2, 24), None);
        let now = at(2025, 3, 5);
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(check_eligibility_at(&db, id, now).unwrap(), 1);
        let claimed = claim_at(&db, id, now, &mut rng).unwrap();
        assert_eq!(claimed.rank, 1);
        assert_eq!(claimed.reward.rarity.name, "Legendary");
        assert_eq!(claimed.reward.owner_id, Some(id));

        let record = db.with_conn(|c| fetch_record(c, id)).unwrap().unwrap();
        assert_eq!(record.last_claimed_at, Some(now));

        assert_eq!(
            league_error(check_eligibility_at(&db, id, now + Duration::days(1))),
            LeagueError::AlreadyClaimed
        );
        assert_eq!(
            league_error(claim_at(&db, id, now + Duration::days(2), &mut rng)),
            LeagueError::AlreadyClaimed
        );
        assert_eq!(testutil::count_items(&db, id), 1);

        assert_eq!(
            check_eligibility_at(&db, id, now + Duration::days(7)).unwrap(),
            1
        );
    }

    #[test]
    fn test_claim_across_year_boundary() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Aria", 1, 12, 8);
        testutil::insert_league_record(&db, id, at(2024, 11, 1), Some(at(2024, 12, 30)));

        assert_eq!(check_eligibility_at(&db, id, at(2025, 1, 2)).unwrap(), 1);
    }

    #[test]
    fn test_claim_a_year_ago_in_week_one_does_not_block() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Aria", 1, 12, 8);
        testutil::insert_league_record(&db, id, at(2023, 11, 1), Some(at(2024, 1, 1)));

        assert_eq!(check_eligibility_at(&db, id, at(2024, 12, 30)).unwrap(), 1);
        let mut rng = StdRng::seed_from_u64(6);
        assert!(claim_at(&db, id, at(2024, 12, 30), &mut rng).is_ok());
        assert_eq!(testutil::count_items(&db, id), 1);
    }

    #[test]
    fn test_failed_reward_rolls_back_claim() {
        let db = Db::open_in_memory().unwrap();
        let id = testutil::insert_player(&db, "Aria", 1, 12, 8);
        testutil::insert_league_record(&db, id, at(2025, 2, 24), None);
        db.with_conn(|c| c.execute("UPDATE equippable_item_blueprints SET required_level = 50", []))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        assert_eq!(
            league_error(claim_at(&db, id, at(2025, 3, 5), &mut rng)),
            LeagueError::NoEligibleBlueprint(1)
        );
        let record = db.with_conn(|c| fetch_record(c, id)).unwrap().unwrap();
        assert_eq!(record.last_claimed_at, None);
    }

    #[test]
    fn test_concurrent_claims_grant_once() {
        const CLAIMERS: usize = 8;
        let db = Arc::new(Db::open_in_memory().unwrap());
        let id = testutil::insert_player(&db, "Aria", 3, 30, 20);
        testutil::insert_league_record(&db, id, at(2025, 2, 24), None);
        let now = at(2025, 3, 5);
        let barrier = Arc::new(Barrier::new(CLAIMERS));

        let handles: Vec<_> = (0..CLAIMERS)
            .map(|seed| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed as u64);
                    barrier.wait();
                    claim_at(&db, id, now, &mut rng)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let granted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(granted, 1);
        for result in results.into_iter().filter(|r| r.is_err()) {
            assert_eq!(league_error(result), LeagueError::AlreadyClaimed);
        }
        assert_eq!(testutil::count_items(&db, id), 1);
    }
}
