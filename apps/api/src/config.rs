use std::str::FromStr;

use anyhow::{ensure, Context, Result};
use jsonwebtoken::Algorithm;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub groq_api_key: String,
    pub llm_base_url: String,
    pub jwt_secret: String,
    /// HMAC family only; tokens are verified with the shared secret.
    pub jwt_algorithm: Algorithm,
    pub port: u16,
    pub rust_log: String,
    /// How many of the most recent postings one match request analyzes.
    pub match_posting_limit: i64,
    /// Provider calls allowed in flight at once, process-wide.
    pub match_concurrency: usize,
    pub match_task_timeout_secs: u64,
    pub provider_requests_per_minute: u32,
    pub model_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            groq_api_key: require_env("GROQ_API_KEY")?,
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_algorithm: env_or("JWT_ALGORITHM", Algorithm::HS256)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_posting_limit: env_or("MATCH_POSTING_LIMIT", 50)?,
            match_concurrency: env_or("MATCH_CONCURRENCY", 4)?,
            match_task_timeout_secs: env_or("MATCH_TASK_TIMEOUT_SECS", 30)?,
            provider_requests_per_minute: env_or("PROVIDER_REQUESTS_PER_MINUTE", 30)?,
            model_cache_ttl_secs: env_or("MODEL_CACHE_TTL_SECS", 300)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            matches!(
                self.jwt_algorithm,
                Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
            ),
            "JWT_ALGORITHM must be one of HS256, HS384, HS512, got {:?}",
            self.jwt_algorithm
        );
        ensure!(
            self.match_posting_limit >= 1,
            "MATCH_POSTING_LIMIT must be at least 1, got {}",
            self.match_posting_limit
        );
        ensure!(self.match_concurrency >= 1, "MATCH_CONCURRENCY must be at least 1");
        ensure!(
            self.match_task_timeout_secs >= 1,
            "MATCH_TASK_TIMEOUT_SECS must be at least 1"
        );
        ensure!(
            self.provider_requests_per_minute >= 1,
            "PROVIDER_REQUESTS_PER_MINUTE must be at least 1"
        );
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
