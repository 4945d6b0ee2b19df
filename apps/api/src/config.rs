use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// How far back a stored episode still counts as "current".
    pub cache_window_days: i64,
    /// Episodes older than this are removed by the retention sweep.
    pub retention_days: i64,
    /// Fixed delay before the single retry of a store read after a connectivity error.
    pub store_retry_delay_ms: u64,
    /// Attempts per oracle call. 1 means the generator never retries.
    pub llm_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cache_window_days: parse_env("PODCAST_CACHE_WINDOW_DAYS", 7)
                .context("PODCAST_CACHE_WINDOW_DAYS must be an integer")?,
            retention_days: parse_env("PODCAST_RETENTION_DAYS", 90)
                .context("PODCAST_RETENTION_DAYS must be an integer")?,
            store_retry_delay_ms: parse_env("STORE_RETRY_DELAY_MS", 1000)
                .context("STORE_RETRY_DELAY_MS must be an integer")?,
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 1)
                .context("LLM_MAX_ATTEMPTS must be an integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/briefing_test".to_string(),
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            cache_window_days: 7,
            retention_days: 90,
            store_retry_delay_ms: 0,
            llm_max_attempts: 1,
        }
    }
}
