use serde::Deserialize;

use confhub_core::config::Config;

/// Check-in service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct CheckinConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port to listen on (default 3120). Env var: `CHECKIN_PORT`.
    #[serde(default = "default_checkin_port")]
    pub checkin_port: u16,
}

fn default_checkin_port() -> u16 {
    3120
}

impl Config for CheckinConfig {}
