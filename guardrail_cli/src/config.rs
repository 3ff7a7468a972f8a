use std::env;

use anyhow::{Context, Result};

use guardrail_core::moderation::catalog::DEFAULT_LOCALE;
use guardrail_core::moderation::validator::ValidationContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub account_seed: Option<String>,
    pub locale: String,
    pub openai_configured: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let account_seed = env::var("ACCOUNT_SEED").ok();
        let db_path = env::var("MODERATION_DB").unwrap_or_else(|_| "moderation_db".to_string());
        let locale = env::var("MODERATION_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string());
        let openai_configured = env::var("OPENAI_CONFIGURED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        Ok(Self {
            db_path,
            account_seed,
            locale,
            openai_configured,
        })
    }

    /// Only the storage-backed commands need a seed.
    pub fn account_seed(&self) -> Result<&str> {
        self.account_seed
            .as_deref()
            .context("ACCOUNT_SEED environment variable not found")
    }

    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            locale: self.locale.clone(),
            openai_configured: self.openai_configured,
        }
    }
}
