use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// user_id: "client-1042"
/// reveal_delay: "1500ms"
/// persistence:
///   sink: remote
///   endpoint: "https://api.example.com/v1"
///   collection: "simulations"
///   retries: 3
///   timeout: "10s"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Opaque identifier saved alongside each simulation
    #[serde(default)]
    pub user_id: Option<String>,

    /// Pause before the result is revealed, e.g. "1500ms" (default: none)
    #[serde(default)]
    pub reveal_delay: Option<String>,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Configured user id, falling back to $USER, then "anonymous".
    pub fn resolved_user_id(&self) -> String {
        self.user_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| "anonymous".to_string())
    }

    /// Parsed reveal delay. Invalid values are caught by validation; treat them as zero here.
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
            .as_deref()
            .and_then(|s| humantime::parse_duration(s).ok())
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Local,
    Remote,
    None,
}

/// Where simulation results are saved.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub sink: SinkKind,

    /// Local history file (default: ~/.config/credit-projector/history.json)
    #[serde(default)]
    pub history_path: Option<String>,

    /// Base URL of the document store (remote sink only)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Collection name appended to the endpoint (default: "simulations")
    #[serde(default)]
    pub collection: Option<String>,

    /// Retries after a failed remote write (default: 2)
    #[serde(default)]
    pub retries: Option<usize>,

    /// Remote request timeout, e.g. "10s" (default: 10s)
    #[serde(default)]
    pub timeout: Option<String>,
}

impl PersistenceConfig {
    pub const DEFAULT_COLLECTION: &'static str = "simulations";
    pub const DEFAULT_RETRIES: usize = 2;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or(Self::DEFAULT_COLLECTION)
    }

    pub fn retries(&self) -> usize {
        self.retries.unwrap_or(Self::DEFAULT_RETRIES)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(|s| humantime::parse_duration(s).ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT)
    }
}
