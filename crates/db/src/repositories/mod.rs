//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Plain reads accept `&PgPool`; methods that must participate in an
//! engine transaction accept `&mut PgConnection` so the caller controls
//! the transaction boundary.

pub mod badge_repo;
pub mod daily_task_repo;
pub mod leaderboard_repo;
pub mod ledger_repo;
pub mod notification_repo;
pub mod streak_repo;
pub mod visitor_repo;

pub use badge_repo::BadgeRepo;
pub use daily_task_repo::DailyTaskRepo;
pub use leaderboard_repo::LeaderboardRepo;
pub use ledger_repo::LedgerRepo;
pub use notification_repo::NotificationRepo;
pub use streak_repo::StreakRepo;
pub use visitor_repo::VisitorRepo;
