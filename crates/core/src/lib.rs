//! Pure domain logic for the gamification engine.
//!
//! Everything in this crate is deterministic and I/O-free: the action
//! catalog and its reward table, the level threshold table, the streak
//! transition state machine, the badge rule language, and the calendar-day
//! boundary policy. Persistence and side effects live in `viblog-db` and
//! `viblog-engine`.

pub mod actions;
pub mod badge_rules;
pub mod day;
pub mod error;
pub mod level;
pub mod streak;
pub mod types;
