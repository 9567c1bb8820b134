// src/config.rs
use std::path::PathBuf;

use crate::utils::error::AppError;

/// Default User-Agent sent to SEC EDGAR. The SEC requires a contact address;
/// override with EDGAR_USER_AGENT for real use.
const DEFAULT_EDGAR_USER_AGENT: &str = "filing_metrics admin@example.com";

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

/// Hosted-model settings. Decoding is deterministic (temperature 0) and the
/// call is bounded by `timeout_secs`; neither is user-tunable.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct EdgarConfig {
    pub user_agent: String,
}

/// Process-wide configuration, built once at startup from CLI arguments and
/// the environment, then passed by reference into the EDGAR client, the
/// extraction engine and the export sinks. Core logic never reads the
/// environment directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub edgar: EdgarConfig,
    pub output_dir: PathBuf,
    pub database_url: Option<String>,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env(
        output_dir: &str,
        database_url: Option<String>,
        debug: bool,
    ) -> Result<Self, AppError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AppError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let model_id =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let user_agent = std::env::var("EDGAR_USER_AGENT")
            .unwrap_or_else(|_| DEFAULT_EDGAR_USER_AGENT.to_string());

        let database_url = database_url.or_else(|| std::env::var("DATABASE_URL").ok());

        Ok(Self {
            model: ModelConfig {
                api_key,
                base_url,
                model_id,
                timeout_secs: 180,
            },
            edgar: EdgarConfig { user_agent },
            output_dir: PathBuf::from(output_dir),
            database_url,
            debug,
        })
    }
}
