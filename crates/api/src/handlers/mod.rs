//! HTTP handlers, grouped by resource.

pub mod health;
pub mod leaderboard;
pub mod notifications;
pub mod visitors;
