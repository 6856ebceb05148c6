//! Level thresholds and the pure XP → level calculator.
//!
//! Level `n` is the largest index whose minimum threshold is at or below
//! the visitor's cumulative XP. Levels 1..=10 come from a fixed table;
//! beyond the table each further level costs a flat [`EXTRA_LEVEL_XP`].

use serde::Serialize;

// ---------------------------------------------------------------------------
// Threshold table
// ---------------------------------------------------------------------------

/// Minimum cumulative XP for levels 1..=10 (index 0 is level 1).
pub const LEVEL_THRESHOLDS: [i64; 10] = [0, 100, 300, 600, 1000, 1500, 2500, 4000, 6000, 10_000];

/// Flat XP cost per level beyond the table.
pub const EXTRA_LEVEL_XP: i64 = 5000;

/// Display tiers: `(min_level, name, icon)`. Cosmetic only.
const TIERS: [(i32, &str, &str); 5] = [
    (1, "Người Mới", "🌱"),
    (3, "Độc Giả", "📖"),
    (5, "Mọt Sách", "📚"),
    (8, "Học Giả", "🎓"),
    (11, "Huyền Thoại", "👑"),
];

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Display metadata for a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub level: i32,
    pub name: &'static str,
    pub icon: &'static str,
    pub min_xp: i64,
    /// Last XP value that still belongs to this level (next threshold - 1).
    pub max_xp: i64,
}

/// Compute the level for a cumulative XP total.
///
/// Total, deterministic. Negative input (rejected upstream by the ledger)
/// clamps to level 1.
pub fn level_from_xp(total_xp: i64) -> i32 {
    if total_xp < 0 {
        return 1;
    }
    let top = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
    if total_xp >= top {
        let extra = (total_xp - top) / EXTRA_LEVEL_XP;
        return LEVEL_THRESHOLDS.len() as i32 + extra as i32;
    }
    // Largest table index whose threshold is <= total_xp.
    let mut level = 1;
    for (i, min) in LEVEL_THRESHOLDS.iter().enumerate() {
        if total_xp >= *min {
            level = i as i32 + 1;
        }
    }
    level
}

/// Minimum cumulative XP needed for a level.
pub fn level_min_xp(level: i32) -> i64 {
    let level = level.max(1);
    if (level as usize) <= LEVEL_THRESHOLDS.len() {
        LEVEL_THRESHOLDS[level as usize - 1]
    } else {
        let top = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
        top + (level as i64 - LEVEL_THRESHOLDS.len() as i64) * EXTRA_LEVEL_XP
    }
}

/// Display metadata for a level: tier name/icon plus the XP span.
pub fn level_info(level: i32) -> LevelInfo {
    let level = level.max(1);
    let (mut name, mut icon) = (TIERS[0].1, TIERS[0].2);
    for (min_level, tier_name, tier_icon) in TIERS {
        if level >= min_level {
            name = tier_name;
            icon = tier_icon;
        }
    }
    LevelInfo {
        level,
        name,
        icon,
        min_xp: level_min_xp(level),
        max_xp: level_min_xp(level + 1) - 1,
    }
}
