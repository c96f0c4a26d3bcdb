//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the four gateway endpoint URLs, the credential backend, and
//! the last used username.
//!
//! Configuration is stored at `~/.config/inout-scanner/config.json`. Every
//! endpoint can be overridden from the environment (see [`Endpoints::with_overrides`]).
//! Overrides only shape the endpoints handed to the gateway client; they are
//! never written back to the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::Endpoint;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "inout-scanner";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Marker left in endpoint URLs that have not been pointed at a deployment yet.
pub const PLACEHOLDER_MARKER: &str = "<your-project-id>";

const DEFAULT_BASE_URL: &str = "https://<your-project-id>.supabase.co/functions/v1";

const ENV_GATEWAY_URL: &str = "INOUT_GATEWAY_URL";
const ENV_LOGIN_URL: &str = "INOUT_LOGIN_URL";
const ENV_LOCATIONS_URL: &str = "INOUT_LOCATIONS_URL";
const ENV_SCAN_URL: &str = "INOUT_SCAN_URL";
const ENV_LOG_URL: &str = "INOUT_LOG_URL";

/// URLs of the four gateway functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login_url: String,
    pub locations_url: String,
    pub scan_url: String,
    pub log_url: String,
}

impl Endpoints {
    /// Derive all four URLs from a single function base URL.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            login_url: format!("{}/login", base),
            locations_url: format!("{}/get-locations", base),
            scan_url: format!("{}/create-entry", base),
            log_url: format!("{}/get-entries", base),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Login => &self.login_url,
            Endpoint::Locations => &self.locations_url,
            Endpoint::Scan => &self.scan_url,
            Endpoint::Log => &self.log_url,
        }
    }

    /// True once the URL no longer carries the deployment placeholder.
    pub fn is_configured(&self, endpoint: Endpoint) -> bool {
        !self.url(endpoint).contains(PLACEHOLDER_MARKER)
    }

    /// Copy of these endpoints with overrides from `lookup` applied. A gateway
    /// base URL is applied first so individual URL overrides win over it.
    pub fn with_overrides<F>(&self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut endpoints = match lookup(ENV_GATEWAY_URL) {
            Some(base) => Self::from_base(&base),
            None => self.clone(),
        };
        if let Some(url) = lookup(ENV_LOGIN_URL) {
            endpoints.login_url = url;
        }
        if let Some(url) = lookup(ENV_LOCATIONS_URL) {
            endpoints.locations_url = url;
        }
        if let Some(url) = lookup(ENV_SCAN_URL) {
            endpoints.scan_url = url;
        }
        if let Some(url) = lookup(ENV_LOG_URL) {
            endpoints.log_url = url;
        }
        endpoints
    }

    /// Endpoints that still need to be filled in.
    pub fn unconfigured(&self) -> Vec<Endpoint> {
        Endpoint::ALL
            .into_iter()
            .filter(|e| !self.is_configured(*e))
            .collect()
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_base(DEFAULT_BASE_URL)
    }
}

/// Where the session token is kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// OS keychain (macOS Keychain, Windows Credential Manager, Linux keyutils)
    #[default]
    Keyring,
    /// Process memory only; every launch starts signed out
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    pub token_store: TokenStoreKind,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = serde_json::from_str(&contents).context("Failed to parse config file")?;
            debug!(path = %path.display(), "Config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Endpoints to connect to: the saved ones with process environment overrides on top.
    pub fn effective_endpoints(&self) -> Endpoints {
        self.endpoints.with_overrides(|key| std::env::var(key).ok())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
