//! HTTP delivery surface for the gamification engine.
//!
//! Thin adapter only: handlers parse JSON, call [`viblog_engine`], and
//! translate the error taxonomy to status codes. Page rendering, auth,
//! and content CRUD live elsewhere in the application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
