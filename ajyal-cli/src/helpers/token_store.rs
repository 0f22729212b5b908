use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tokens are treated as expired slightly early so a token that dies
/// mid-batch is refreshed up front instead.
const EXPIRY_SKEW_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// File-backed replacement for the usual in-memory token cache: the batch
/// runs once and exits, so tokens must survive between runs.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Missing or unreadable token files just mean "not authorized yet".
    pub fn load(&self) -> Option<StoredTokens> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                tracing::warn!("Discarding unreadable token file {:?}: {}", self.path, e);
                None
            }
        }
    }

    pub fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create token directory {parent:?}"))?;
        }
        let raw = serde_json::to_string_pretty(tokens).context("serialize tokens")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("write token file {:?}", self.path))
    }

    pub fn valid_access_token(&self) -> Option<String> {
        let tokens = self.load()?;
        if Utc::now() < tokens.expires_at - Duration::minutes(EXPIRY_SKEW_MINUTES) {
            Some(tokens.access_token)
        } else {
            None
        }
    }
}
