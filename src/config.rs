use std::env;
use thiserror::Error;

pub const API_KEY_VAR: &str = "API_KEY";

/// Crawler output, and the enricher's input.
pub const LIBRARIES_CSV: &str = "libraries_list.csv";
/// Enricher output.
pub const ENRICHED_CSV: &str = "library_details_enriched.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API_KEY in environment (set it or add it to .env)")]
    MissingApiKey,
}

pub struct Config {
    pub api_key: String,
}

impl Config {
    /// Loads `.env` if present, then reads the geocoding API key from the
    /// process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let api_key = env::var(API_KEY_VAR).map_err(|_| ConfigError::MissingApiKey)?;
        Ok(Config { api_key })
    }
}
