pub mod item;
pub mod league;
pub mod player;
pub mod progress;
pub mod usable;
