//! Configuration handling for the form

use crate::relay::RateLimit;
use crate::state::forms::FormVariant;
use crate::state::RelayTarget;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables holding the relay's public key, in lookup order
pub const PUBLIC_KEY_VARS: &[&str] = &["EMAIL_PUBLIC_KEY", "NEXT_PUBLIC_EMAIL_PUBLIC_KEY"];

/// Overrides the relay address from the config file
pub const RELAY_URL_VAR: &str = "AMBASSADOR_RELAY_URL";

const DEFAULT_SERVICE_ID: &str = "service_h6lo7jb";
const DEFAULT_TEMPLATE_ID: &str = "template_voccwdi";
const DEFAULT_RATE_LIMIT_ID: &str = "vercel";
const DEFAULT_THROTTLE_MS: u64 = 5000;

/// User configuration for the form
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Relay service id
    pub service_id: Option<String>,
    /// Relay template id
    pub template_id: Option<String>,
    /// Relay base address
    pub relay_url: Option<String>,
    /// Rate-limit bucket shared by sends from this client
    pub rate_limit_id: Option<String>,
    /// Minimum interval between sends, in milliseconds (0 disables)
    pub throttle_ms: Option<u64>,
    /// Which form to show
    pub variant: Option<FormVariant>,
}

impl FormConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "prasaga", "ambassador-form")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides looked up by variable name
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(RELAY_URL_VAR).filter(|url| !url.trim().is_empty()) {
            self.relay_url = Some(url);
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn variant(&self) -> FormVariant {
        self.variant.unwrap_or_default()
    }

    pub fn relay_url(&self) -> &str {
        self.relay_url
            .as_deref()
            .unwrap_or(crate::relay::DEFAULT_RELAY_URL)
    }

    pub fn target(&self) -> RelayTarget {
        RelayTarget {
            service_id: self
                .service_id
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE_ID.to_string()),
            template_id: self
                .template_id
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string()),
        }
    }

    /// Send throttle, or `None` when disabled
    pub fn rate_limit(&self) -> Option<RateLimit> {
        let throttle_ms = self.throttle_ms.unwrap_or(DEFAULT_THROTTLE_MS);
        (throttle_ms > 0).then(|| RateLimit {
            id: self
                .rate_limit_id
                .clone()
                .unwrap_or_else(|| DEFAULT_RATE_LIMIT_ID.to_string()),
            throttle: Duration::from_millis(throttle_ms),
        })
    }
}

/// Public key from the environment; only checked when a submission is sent
pub fn public_key_from_env() -> Option<String> {
    resolve_public_key(|name| std::env::var(name).ok())
}

/// First non-blank key among [`PUBLIC_KEY_VARS`]
fn resolve_public_key(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    PUBLIC_KEY_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|key| !key.trim().is_empty()))
}
