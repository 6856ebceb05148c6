//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus any create DTOs the repositories need.

pub mod badge;
pub mod daily_task;
pub mod leaderboard;
pub mod notification;
pub mod point_transaction;
pub mod streak;
pub mod visitor;
