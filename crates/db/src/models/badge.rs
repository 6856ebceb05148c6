//! Badge catalog and grant entities.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use viblog_core::badge_rules::BadgeRule;
use viblog_core::types::{DbId, Timestamp};

/// A row from the `badges` catalog.
///
/// `requirement` is the tagged rule object; a catalog row whose jsonb does
/// not match any [`BadgeRule`] variant fails to load, which is the intended
/// failure mode for a malformed rule.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Badge {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub requirement: Json<BadgeRule>,
    pub rarity: String,
    pub xp_reward: i32,
}

/// A badge a visitor has earned, joined with its catalog entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EarnedBadge {
    pub badge_id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub rarity: String,
    pub xp_reward: i32,
    pub earned_at: Timestamp,
    pub is_featured: bool,
}
