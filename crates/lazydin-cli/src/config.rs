//! Persistent settings, stored as JSON under the user's config directory.
//!
//! ```json
//! {
//!   "credentials": { "username": "me@example.com", "password": "..." },
//!   "storage": "/home/me/.config/lazydin/lazydin.sqlite",
//!   "browser": { "headless": true, "maximized": true, "wait_timeout_secs": 30 }
//! }
//! ```
//!
//! `browser.debugging_port` pins Chrome's remote debugging port; a free port
//! is picked for every launch when it is absent.
//!
//! ```json
//! {
//!   "browser": { "debugging_port": 9333 }
//! }
//! ```

use anyhow::{Context, Result, bail};
use lazydin_browser::{BrowserOptions, Credentials, ProfileManager};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "lazydin";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "lazydin.sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub maximized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
    pub wait_timeout_secs: u64,
    /// Name of a persistent profile under `~/.lazydin/profiles`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debugging_port: Option<u16>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            maximized: true,
            chrome_path: None,
            wait_timeout_secs: 30,
            profile: None,
            debugging_port: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub credentials: CredentialSettings,
    /// SQLite database file
    pub storage: PathBuf,
    pub browser: BrowserSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: CredentialSettings::default(),
            storage: default_storage_path(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Settings {
    /// `<config_dir>/lazydin/config.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .context("Could not determine the user config directory; pass --config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load the settings, writing the defaults first if the file is missing
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::debug!("No config at {}, writing defaults", path.display());
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Credentials from the flags, falling back to the stored ones
    pub fn credentials(&self, user: Option<String>, password: Option<String>) -> Result<Credentials> {
        let username = user.unwrap_or_else(|| self.credentials.username.clone());
        let password = password.unwrap_or_else(|| self.credentials.password.clone());

        if username.is_empty() || password.is_empty() {
            bail!(
                "Missing credentials: run `lazydin create-credentials` or pass --user and --password"
            );
        }

        Ok(Credentials::new(username, password))
    }

    pub fn browser_options(&self) -> Result<BrowserOptions> {
        let profile = match &self.browser.profile {
            Some(name) => Some(ProfileManager::profiles_dir()?.join(name)),
            None => None,
        };

        Ok(BrowserOptions {
            chrome_path: self.browser.chrome_path.clone(),
            profile,
            headless: self.browser.headless,
            maximized: self.browser.maximized,
            debugging_port: self.browser.debugging_port,
            wait_timeout: Duration::from_secs(self.browser.wait_timeout_secs),
        })
    }
}

fn default_storage_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}
