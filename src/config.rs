use std::env;

use chrono::Duration;

/// Runtime configuration, assembled once at startup from environment variables.
///
/// The signing secret and token TTL are carried here and injected into the
/// [`TokenService`](crate::auth::token::TokenService) at construction, so the
/// auth core never reads ambient global state.
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// Panics when `DATABASE_URL` or `JWT_SECRET` is missing: a process
    /// without a signing secret must not come up at all, and handling this
    /// per-request would be worse than refusing to start.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl: Duration::hours(
                env::var("JWT_TTL_HOURS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()
                    .expect("JWT_TTL_HOURS must be a number"),
            ),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
