use chrono::{DateTime, Datelike, Duration, Utc};

/// Whether `then` falls in the same weekly claim window as `now`.
///
/// Windows are keyed by ISO week number together with the calendar year. When `now` is in ISO
/// week 1 and `then` sits in week 52 or 53 of the previous year, the two are adjacent windows,
/// never the same one. Timestamps a week or more apart are never in the same window, even
/// when their week number and calendar year coincide (2024-01-01 and 2024-12-30 are both W01).
pub fn same_claim_window(then: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if (now - then).abs() >= Duration::days(7) {
        return false;
    }
    let (then_week, now_week) = (then.iso_week().week(), now.iso_week().week());
    let (then_year, now_year) = (then.year(), now.year());

    if now_week == 1 && then_week >= 52 && then_year == now_year - 1 {
        return false;
    }
    then_week == now_week && then_year == now_year
}
