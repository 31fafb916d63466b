//! Weekly league: ranking by win rate, reward eligibility and claims, sparring matches.

pub mod gate;
pub mod opponent;
pub mod ranking;
pub mod reward;
pub mod week;
