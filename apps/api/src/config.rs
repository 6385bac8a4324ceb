use anyhow::{Context, Result};

/// Upload ceiling applied when `MAX_UPLOAD_BYTES` is unset (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub skill_taxonomy_path: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            skill_taxonomy_path: std::env::var("SKILL_TAXONOMY_PATH")
                .unwrap_or_else(|_| "config/skill_taxonomy.json".to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration used by router tests; never touches the environment.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/placement_test".to_string(),
            skill_taxonomy_path: "config/skill_taxonomy.json".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
