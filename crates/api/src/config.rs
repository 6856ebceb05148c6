use viblog_core::day::DayBoundary;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Calendar-day boundary for streaks and daily tasks.
    pub day_boundary: DayBoundary,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `DAY_BOUNDARY_OFFSET_MINUTES` | unset (UTC days)        |
    ///
    /// `DAY_BOUNDARY_OFFSET_MINUTES=420` makes days roll over at midnight
    /// UTC+7 (Vietnam time).
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let day_boundary = match std::env::var("DAY_BOUNDARY_OFFSET_MINUTES") {
            Ok(raw) => {
                let minutes: i32 = raw
                    .parse()
                    .expect("DAY_BOUNDARY_OFFSET_MINUTES must be a valid i32");
                DayBoundary::FixedOffsetMinutes(minutes)
            }
            Err(_) => DayBoundary::Utc,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            day_boundary,
        }
    }
}
