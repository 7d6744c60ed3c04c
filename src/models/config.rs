// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ProbeMode;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// GraphQL endpoint settings shared by the finder and the probe
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Discovery query settings
    #[serde(default)]
    pub finder: FinderConfig,

    /// Connectivity probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Local time rendering
    #[serde(default)]
    pub display: DisplayConfig,

    /// Outbound notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Dedup store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override settings from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Override settings from an arbitrary variable lookup.
    ///
    /// Empty values are ignored, so an exported-but-blank variable behaves
    /// like an unset one.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = var("VOLO_GRAPHQL_ENDPOINT").or_else(|| var("PROBE_ENDPOINT")) {
            self.endpoint.url = url;
        }

        if let Some(agent) = var("PROBE_USER_AGENT") {
            self.endpoint.user_agent = Some(agent);
        }

        if let Some(timeout) = var("PROBE_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.probe.timeout_secs = secs;
            }
        }

        if let Some(timeout) = var("FINDER_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.finder.timeout_secs = secs;
            }
        }

        if let Some(mode) = var("PROBE_MODE") {
            self.probe.mode = ProbeMode::parse_lenient(&mode);
        }

        if let Some(tz) = var("LOCAL_TIMEZONE") {
            self.display.timezone = tz;
        }

        if let Some(topic) = var("SNS_TOPIC_ARN") {
            self.notify.destination = Some(topic);
        }

        if let Some(table) = var("DDB_TABLE_NAME") {
            self.store.table = Some(table);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "endpoint.url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.endpoint.role.trim().is_empty() {
            return Err(AppError::validation("endpoint.role is empty"));
        }
        if self.finder.timeout_secs == 0 {
            return Err(AppError::validation("finder.timeout_secs must be > 0"));
        }
        if self.probe.timeout_secs == 0 {
            return Err(AppError::validation("probe.timeout_secs must be > 0"));
        }
        if self.finder.limit == 0 || self.probe.limit == 0 {
            return Err(AppError::validation("query limits must be > 0"));
        }
        if self.finder.venues.is_empty() {
            return Err(AppError::validation("No venues defined"));
        }
        if self.finder.sports.is_empty() {
            return Err(AppError::validation("No sports defined"));
        }
        Ok(())
    }
}

/// GraphQL endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint URL
    #[serde(default = "defaults::endpoint_url")]
    pub url: String,

    /// Value of the `x-hasura-role` header
    #[serde(default = "defaults::role")]
    pub role: String,

    /// Optional User-Agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: defaults::endpoint_url(),
            role: defaults::role(),
            user_agent: None,
        }
    }
}

/// A venue whose openings are watched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Venue {
    /// Upstream venue id
    pub id: String,

    /// Human label, only used in logs
    #[serde(default)]
    pub name: String,
}

/// Discovery query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Request timeout in seconds
    #[serde(default = "defaults::finder_timeout")]
    pub timeout_secs: u64,

    /// Maximum rows requested from `discover_daily`
    #[serde(default = "defaults::finder_limit")]
    pub limit: u32,

    /// Organization (city) name
    #[serde(default = "defaults::organization")]
    pub organization: String,

    /// Sport names
    #[serde(default = "defaults::sports")]
    pub sports: Vec<String>,

    /// Program types
    #[serde(default = "defaults::program_types")]
    pub program_types: Vec<String>,

    /// Venues to watch
    #[serde(default = "defaults::venues")]
    pub venues: Vec<Venue>,
}

impl FinderConfig {
    /// Venue ids in configured order.
    pub fn venue_ids(&self) -> Vec<&str> {
        self.venues.iter().map(|v| v.id.as_str()).collect()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::finder_timeout(),
            limit: defaults::finder_limit(),
            organization: defaults::organization(),
            sports: defaults::sports(),
            program_types: defaults::program_types(),
            venues: defaults::venues(),
        }
    }
}

/// Connectivity probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Request timeout in seconds
    #[serde(default = "defaults::probe_timeout")]
    pub timeout_secs: u64,

    /// Query shape to send
    #[serde(default)]
    pub mode: ProbeMode,

    /// Row limit for the discover mode
    #[serde(default = "defaults::probe_limit")]
    pub limit: u32,

    /// Body preview length for 2xx responses
    #[serde(default = "defaults::success_preview")]
    pub success_preview_chars: usize,

    /// Body preview length for non-2xx responses
    #[serde(default = "defaults::error_preview")]
    pub error_preview_chars: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::probe_timeout(),
            mode: ProbeMode::default(),
            limit: defaults::probe_limit(),
            success_preview_chars: defaults::success_preview(),
            error_preview_chars: defaults::error_preview(),
        }
    }
}

/// Local time rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA timezone name; unknown names fall back to UTC
    #[serde(default = "defaults::timezone")]
    pub timezone: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: defaults::timezone(),
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Channel destination (an SNS topic ARN in Lambda)
    #[serde(default)]
    pub destination: Option<String>,

    /// Message subject
    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// First line of every message
    #[serde(default = "defaults::header")]
    pub header: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            destination: None,
            subject: defaults::subject(),
            header: defaults::header(),
        }
    }
}

/// Dedup store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Table holding one item per notified event key
    #[serde(default)]
    pub table: Option<String>,
}

mod defaults {
    use super::Venue;

    // Endpoint defaults
    pub fn endpoint_url() -> String {
        "https://volosports.com/hapi/v1/graphql".into()
    }
    pub fn role() -> String {
        "PLAYER".into()
    }

    // Finder defaults
    pub fn finder_timeout() -> u64 {
        30
    }
    pub fn finder_limit() -> u32 {
        100
    }
    pub fn organization() -> String {
        "Denver".into()
    }
    pub fn sports() -> Vec<String> {
        vec!["Volleyball".into()]
    }
    pub fn program_types() -> Vec<String> {
        vec!["PICKUP".into()]
    }
    pub fn venues() -> Vec<Venue> {
        vec![
            Venue {
                id: "6ef3e03d-9655-4102-9779-a717c28523ef".to_string(),
                name: "DU Gates Fieldhouse".to_string(),
            },
            Venue {
                id: "ef20648e-2eb2-4eee-8a12-6faf00fccac9".to_string(),
                name: "Club Volo SoBo Indoor".to_string(),
            },
            Venue {
                id: "8c856ee8-30f6-45ac-9f02-983178ba0722".to_string(),
                name: "Volo Sports Arena".to_string(),
            },
        ]
    }

    // Probe defaults
    pub fn probe_timeout() -> u64 {
        20
    }
    pub fn probe_limit() -> u32 {
        10
    }
    pub fn success_preview() -> usize {
        500
    }
    pub fn error_preview() -> usize {
        1000
    }

    // Display defaults
    pub fn timezone() -> String {
        "America/Denver".into()
    }

    // Notify defaults
    pub fn subject() -> String {
        "Volo Volleyball Alert".into()
    }
    pub fn header() -> String {
        "New Volo volleyball openings (DU / SoBo / Volo Sports Arena):".into()
    }
}
