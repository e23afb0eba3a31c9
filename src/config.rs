//! Process configuration
//!
//! All environment lookups happen here, once, at startup. Components receive
//! explicit values through their constructors and never touch the environment.

use crate::error::AssistantError;
use crate::Result;
use std::env;
use std::path::PathBuf;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_LEDGER_FILE: &str = "movements.csv";
const DEFAULT_PORT: u16 = 8080;

/// Immutable configuration snapshot taken at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub telegram_bot_token: String,
    pub ledger_path: PathBuf,
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment (and a `.env` file if present).
    ///
    /// Missing required keys fail here, at boot, rather than surfacing later
    /// inside a request.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let openai_api_key = require("OPENAI_API_KEY")?;
        let telegram_bot_token = require("TELEGRAM_BOT_TOKEN")?;

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());

        let ledger_path = env::var("LEDGER_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEDGER_FILE));

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                AssistantError::ConfigError(format!("PORT is not a valid port number: {}", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            openai_api_key,
            openai_model,
            telegram_bot_token,
            ledger_path,
            port,
        })
    }
}

fn require(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AssistantError::ConfigError(format!(
            "{} environment variable is required",
            key
        ))),
    }
}
