//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFGRID_*)
//! 2. TOML config file (if OFFGRID_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::store::{StoreNames, VersionTag};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFGRID_*)
/// 2. TOML config file (if OFFGRID_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment generation identifier. Both store names derive from it.
    ///
    /// Set via OFFGRID_VERSION_TAG environment variable.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Path to the SQLite store database.
    ///
    /// Set via OFFGRID_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Application origin. Relative request URLs resolve against it and
    /// responses from any other origin are cross-origin.
    ///
    /// Set via OFFGRID_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Assets pre-populated into the static store during setup.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Document served from the static store when a page request cannot
    /// be satisfied any other way.
    #[serde(default = "default_root_document")]
    pub root_document: String,

    /// URL suffixes that mark a request as a static resource.
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,

    /// URL substrings that mark a request as an image.
    #[serde(default = "default_image_hosts")]
    pub image_hosts: Vec<String>,

    /// Image file extensions (without the dot), matched case-insensitively.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// URL prefixes that are never intercepted.
    #[serde(default = "default_bypass_schemes")]
    pub bypass_schemes: Vec<String>,

    /// Deferred-sync tag that triggers the synchronization routine.
    ///
    /// Set via OFFGRID_SYNC_TAG environment variable.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Defaults for push notifications.
    #[serde(default)]
    pub notification: NotificationDefaults,

    /// User-Agent string for network fetches.
    ///
    /// Set via OFFGRID_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    ///
    /// Set via OFFGRID_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum response body size in bytes.
    ///
    /// Set via OFFGRID_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// Values used when a push payload leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDefaults {
    #[serde(default = "default_notification_title")]
    pub title: String,
    #[serde(default = "default_notification_body")]
    pub body: String,
    #[serde(default = "default_notification_icon")]
    pub icon: String,
    #[serde(default = "default_notification_badge")]
    pub badge: String,
    /// Target opened when the notification is clicked. Also the
    /// application root used when a notification carries no target.
    #[serde(default = "default_notification_url")]
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            body: default_notification_body(),
            icon: default_notification_icon(),
            badge: default_notification_badge(),
            url: default_notification_url(),
        }
    }
}

fn default_version_tag() -> String {
    "pyti-v4".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offgrid-stores.sqlite")
}

fn default_origin() -> String {
    "http://localhost:5000/".into()
}

fn default_static_assets() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./style.css",
        "./script.js",
        "./manifest.json",
        "./logo.svg",
        "https://fonts.googleapis.com/css2?family=Bebas+Neue&family=Lora:ital,wght@0,400;0,600;1,400&family=Inter:wght@300;400;500;600&display=swap",
        "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css",
        "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_root_document() -> String {
    "./index.html".into()
}

fn default_static_extensions() -> Vec<String> {
    vec![".css".into(), ".js".into(), ".json".into()]
}

fn default_image_hosts() -> Vec<String> {
    vec!["unsplash.com".into(), "images.".into()]
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "webp", "svg"].into_iter().map(String::from).collect()
}

fn default_bypass_schemes() -> Vec<String> {
    vec!["chrome-extension://".into()]
}

fn default_sync_tag() -> String {
    "sync-contact".into()
}

fn default_notification_title() -> String {
    "Plan Your Trip India".into()
}

fn default_notification_body() -> String {
    "Your trip plan is ready!".into()
}

fn default_notification_icon() -> String {
    "https://img.icons8.com/fluency/192/india.png".into()
}

fn default_notification_badge() -> String {
    "https://img.icons8.com/fluency/96/india.png".into()
}

fn default_notification_url() -> String {
    "./".into()
}

fn default_user_agent() -> String {
    "offgrid/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version_tag: default_version_tag(),
            db_path: default_db_path(),
            origin: default_origin(),
            static_assets: default_static_assets(),
            root_document: default_root_document(),
            static_extensions: default_static_extensions(),
            image_hosts: default_image_hosts(),
            image_extensions: default_image_extensions(),
            bypass_schemes: default_bypass_schemes(),
            sync_tag: default_sync_tag(),
            notification: NotificationDefaults::default(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Store names for the configured version tag.
    ///
    /// Computed once at startup and handed to every component that needs
    /// to address a store.
    pub fn store_names(&self) -> StoreNames {
        StoreNames::new(VersionTag::new(self.version_tag.clone()))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFGRID_`
    /// 2. TOML file from `OFFGRID_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFGRID_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFGRID_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
