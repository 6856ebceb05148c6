use std::sync::Arc;

use viblog_engine::GamificationEngine;
use viblog_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: viblog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The gamification engine.
    pub engine: GamificationEngine,
    /// Event bus the engine publishes on.
    pub event_bus: Arc<EventBus>,
}
