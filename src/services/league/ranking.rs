use crate::db::Db;
use crate::error::AppError;
use crate::models::league::*;
use crate::validation;
use rusqlite::Connection;
use std::cmp::Ordering;

/// Battles a player must have fought before they appear in the ranking.
pub const MIN_RANKED_BATTLES: u32 = 10;

pub fn win_rate(total_battles: u32, won_battles: u32) -> Option<f64> {
    if total_battles >= MIN_RANKED_BATTLES {
        Some(won_battles as f64 / total_battles as f64)
    } else {
        None
    }
}

/// Unranked players compare below every ranked one.
fn compare_win_rate(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Orders a stats snapshot: win rate descending, then battles descending, then player id.
pub fn rank_players(stats: Vec<PlayerStats>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = stats
        .into_iter()
        .map(|s| RankedEntry {
            win_rate: win_rate(s.total_battles, s.won_battles),
            player_id: s.player_id,
            name: s.name,
            level: s.level,
            total_battles: s.total_battles,
            won_battles: s.won_battles,
            rank: None,
        })
        .collect();

    entries.sort_by(|a, b| {
        compare_win_rate(b.win_rate, a.win_rate)
            .then_with(|| b.total_battles.cmp(&a.total_battles))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    for (position, entry) in entries.iter_mut().enumerate() {
        if entry.win_rate.is_some() {
            entry.rank = Some(position as u32 + 1);
        }
    }
    entries
}

/// Counters outside the `u32` range are clamped so one bad row cannot fail the whole ranking.
fn clamp_count(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn load_stats(conn: &Connection) -> rusqlite::Result<Vec<PlayerStats>> {
    let mut stmt =
        conn.prepare("SELECT id, name, level, n_battles, n_won_battles FROM players")?;
    let rows = stmt.query_map([], |row| {
        Ok(PlayerStats {
            player_id: row.get(0)?,
            name: row.get(1)?,
            level: row.get(2)?,
            total_battles: clamp_count(row.get(3)?),
            won_battles: clamp_count(row.get(4)?),
        })
    })?;
    rows.collect()
}

/// Full leaderboard recomputed from the current player table.
pub fn compute_ranking(conn: &Connection) -> rusqlite::Result<Vec<RankedEntry>> {
    Ok(rank_players(load_stats(conn)?))
}

/// Rank of `player_id`, or `None` while the player has too few battles to be ranked.
pub fn rank_of(conn: &Connection, player_id: i64) -> Result<Option<u32>, AppError> {
    compute_ranking(conn)?
        .into_iter()
        .find(|entry| entry.player_id == player_id)
        .map(|entry| entry.rank)
        .ok_or_else(|| AppError::NotFound("Player not found".into()))
}

pub fn league_standing(db: &Db, caller: Option<i64>) -> Result<LeagueStanding, AppError> {
    if let Some(player_id) = caller {
        validation::validate_existing_player(db, "playerId", player_id)?;
    }
    let ranking = db.with_conn(compute_ranking)?;
    let position = caller.and_then(|id| {
        ranking
            .iter()
            .find(|entry| entry.player_id == id)
            .and_then(|entry| entry.rank)
    });
    Ok(LeagueStanding { ranking, position })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use proptest::prelude::*;

    fn stats(player_id: i64, total_battles: u32, won_battles: u32) -> PlayerStats {
        PlayerStats {
            player_id,
            name: format!("player-{}", player_id),
            level: 1,
            total_battles,
            won_battles,
        }
    }

    fn order(entries: &[RankedEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.player_id).collect()
    }

    #[test]
    fn test_higher_win_rate_ranks_first() {
        // 8/12 beats 10/20 even with fewer battles.
        let ranked = rank_players(vec![stats(2, 20, 10), stats(1, 12, 8)]);
        assert_eq!(order(&ranked), [1, 2]);
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[1].rank, Some(2));
    }

    #[test]
    fn test_equal_win_rate_prefers_more_battles() {
        let ranked = rank_players(vec![stats(1, 10, 5), stats(2, 30, 15), stats(3, 20, 10)]);
        assert_eq!(order(&ranked), [2, 3, 1]);
    }

    #[test]
    fn test_unranked_players_sort_last_without_rank() {
        let ranked = rank_players(vec![stats(1, 9, 9), stats(2, 10, 0), stats(3, 0, 0)]);
        assert_eq!(order(&ranked), [2, 1, 3]);
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[0].win_rate, Some(0.0));
        assert_eq!(ranked[1].rank, None);
        assert_eq!(ranked[1].win_rate, None);
    }

    #[test]
    fn test_rank_of() {
        let db = Db::open_in_memory().unwrap();
        let a = testutil::insert_player(&db, "A", 1, 12, 8);
        let b = testutil::insert_player(&db, "B", 1, 20, 10);
        let rookie = testutil::insert_player(&db, "Rookie", 1, 9, 9);

        db.with_conn(|conn| {
            assert_eq!(rank_of(conn, a).unwrap(), Some(1));
            assert_eq!(rank_of(conn, b).unwrap(), Some(2));
            assert_eq!(rank_of(conn, rookie).unwrap(), None);
            assert!(matches!(rank_of(conn, 404), Err(AppError::NotFound(_))));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_out_of_range_counters_do_not_break_ranking() {
        let db = Db::open_in_memory().unwrap();
        let a = testutil::insert_player(&db, "A", 1, 12, 8);
        let huge = testutil::insert_player(&db, "Huge", 1, 5_000_000_000, 5_000_000_000);
        let negative = testutil::insert_player(&db, "Negative", 1, -3, -1);

        let ranking = db.with_conn(compute_ranking).unwrap();
        assert_eq!(order(&ranking), [huge, a, negative]);
        assert_eq!(ranking[0].total_battles, u32::MAX);
        assert_eq!(ranking[2].total_battles, 0);
        assert_eq!(ranking[2].rank, None);
    }

    #[test]
    fn test_league_standing_reports_caller_position() {
        let db = Db::open_in_memory().unwrap();
        testutil::insert_player(&db, "A", 1, 12, 8);
        let b = testutil::insert_player(&db, "B", 1, 20, 10);
        let rookie = testutil::insert_player(&db, "Rookie", 1, 3, 1);

        let standing = league_standing(&db, Some(b)).unwrap();
        assert_eq!(standing.ranking.len(), 3);
        assert_eq!(standing.position, Some(2));
        assert_eq!(league_standing(&db, Some(rookie)).unwrap().position, None);
        assert_eq!(league_standing(&db, None).unwrap().position, None);
        assert!(matches!(
            league_standing(&db, Some(999)),
            Err(AppError::Validation(_))
        ));
    }

    fn arb_stats() -> impl Strategy<Value = Vec<PlayerStats>> {
        prop::collection::vec((0u32..40, 0u32..40), 0..30).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (total, won))| stats(i as i64 + 1, total, won.min(total)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_ranking_is_ordered_and_deterministic(snapshot in arb_stats()) {
            let first = rank_players(snapshot.clone());
            let mut reversed = snapshot.clone();
            reversed.reverse();
            let second = rank_players(reversed);
            prop_assert_eq!(&first, &second);

            for pair in first.windows(2) {
                let (hi, lo) = (&pair[0], &pair[1]);
                match (hi.win_rate, lo.win_rate) {
                    (Some(x), Some(y)) => {
                        prop_assert!(x >= y);
                        if x == y {
                            prop_assert!(hi.total_battles >= lo.total_battles);
                        }
                    }
                    (None, Some(_)) => {
                        prop_assert!(false, "unranked above ranked");
                    }
                    _ => {}
                }
            }

            for (i, entry) in first.iter().enumerate() {
                if entry.total_battles < MIN_RANKED_BATTLES {
                    prop_assert_eq!(entry.rank, None);
                } else {
                    prop_assert_eq!(entry.rank, Some(i as u32 + 1));
                }
            }
        }
    }
}
