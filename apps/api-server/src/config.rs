//! Application configuration loaded from environment variables.

use std::env;

use agora_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = Self::database_url().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
        }
    }

    /// `DATABASE_URL`, or a URL assembled from `POSTGRES_USER`, `POSTGRES_PASSWORD`,
    /// `POSTGRES_HOST` and `POSTGRES_DB` when `POSTGRES_HOST` is set.
    fn database_url() -> Option<String> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Some(url);
        }

        let host = env::var("POSTGRES_HOST").ok()?;
        let user = env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
        let password = env::var("POSTGRES_PASSWORD").unwrap_or_default();
        let db = env::var("POSTGRES_DB").unwrap_or_else(|_| user.clone());

        Some(DatabaseConfig::postgres_url(&user, &password, &host, &db))
    }
}
