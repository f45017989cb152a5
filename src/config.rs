use std::str::FromStr;

use crate::error::AppError;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub request_timeout_secs: u64,
    /// Base64-encoded 32-byte signing secret. Generated at startup when absent.
    pub token_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            database_url: "sqlite://messagely.db?mode=rwc".to_string(),
            db_max_connections: 20,
            db_min_connections: 5,
            request_timeout_secs: 30,
            token_secret: None,
            token_ttl_hours: 24,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}

/// Parse an optional environment variable, keeping `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Config::default();

        Ok(Config {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env_or("SERVER_PORT", defaults.server_port)?,
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: env_or("DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            token_secret: std::env::var("TOKEN_SECRET").ok().filter(|s| !s.is_empty()),
            token_ttl_hours: env_or("TOKEN_TTL_HOURS", defaults.token_ttl_hours)?,
            hash_memory_kib: env_or("HASH_MEMORY_KIB", defaults.hash_memory_kib)?,
            hash_iterations: env_or("HASH_ITERATIONS", defaults.hash_iterations)?,
            hash_parallelism: env_or("HASH_PARALLELISM", defaults.hash_parallelism)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
