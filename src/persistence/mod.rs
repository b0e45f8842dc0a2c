pub mod local;
pub mod remote;

pub use local::{get_history_path, load_history, History};
pub use remote::RemoteSink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::{Config, SinkKind};
use crate::profile::Profile;
use crate::scoring::Projection;

/// A simulation input and its result, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub user_id: String,
    /// Assigned by the store, never by the caller
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    pub profile: Profile,
    pub projection: Projection,
}

impl SimulationRecord {
    pub fn new(user_id: &str, profile: Profile, projection: Projection) -> Self {
        Self {
            user_id: user_id.to_string(),
            saved_at: None,
            profile,
            projection,
        }
    }
}

/// What the store reported back after a successful write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReceipt {
    pub id: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum SinkError {
    Config(String),
    Io(String),
    Serialize(String),
    Transport(String),
    Rejected { status: u16, body: String },
}

impl SinkError {
    /// Network failures and server-side errors are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            SinkError::Transport(_) => true,
            SinkError::Rejected { status, .. } => *status >= 500 || *status == 429,
            SinkError::Config(_) | SinkError::Io(_) | SinkError::Serialize(_) => false,
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Config(msg) => write!(f, "Invalid persistence config: {}", msg),
            SinkError::Io(msg) => write!(f, "Failed to write history: {}", msg),
            SinkError::Serialize(msg) => write!(f, "Failed to serialize simulation: {}", msg),
            SinkError::Transport(msg) => write!(f, "Could not reach the store: {}", msg),
            SinkError::Rejected { status, body } => {
                write!(f, "Store rejected the simulation (HTTP {}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for SinkError {}

/// Destination for finished simulations.
#[derive(Debug, Clone)]
pub enum Sink {
    Local(PathBuf),
    Remote(RemoteSink),
    Disabled,
}

impl Sink {
    /// Build the sink described by the config.
    pub fn from_config(config: &Config) -> Result<Self, SinkError> {
        let persistence = &config.persistence;
        match persistence.sink {
            SinkKind::None => Ok(Sink::Disabled),
            SinkKind::Local => Ok(Sink::Local(
                persistence
                    .history_path
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or_else(get_history_path),
            )),
            SinkKind::Remote => {
                let endpoint = persistence.endpoint.as_deref().ok_or_else(|| {
                    SinkError::Config("no endpoint configured for the remote sink".to_string())
                })?;
                Ok(Sink::Remote(RemoteSink::new(
                    endpoint,
                    persistence.collection(),
                    persistence.timeout(),
                    persistence.retries(),
                    remote::get_token_from_env(),
                )?))
            }
        }
    }

    /// Note for the `history` command, which only reads the local file.
    pub fn history_note(kind: SinkKind) -> Option<&'static str> {
        match kind {
            SinkKind::Local => None,
            SinkKind::Remote => Some("Note: history is kept locally, remote saves are not listed"),
            SinkKind::None => Some("Note: saving is disabled, only earlier saves are listed"),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Sink::Local(path) => format!("local history at {}", path.display()),
            Sink::Remote(remote) => format!("document store at {}", remote.url()),
            Sink::Disabled => "disabled".to_string(),
        }
    }

    /// Save a record. `Ok(None)` means persistence is disabled.
    ///
    /// Errors never touch the record itself; callers keep showing the projection.
    pub async fn save(&self, record: SimulationRecord) -> Result<Option<SaveReceipt>, SinkError> {
        match self {
            Sink::Disabled => Ok(None),
            Sink::Remote(remote) => remote.save(&record).await.map(Some),
            Sink::Local(path) => {
                let path = path.clone();
                // Keep file I/O off the async runtime
                let saved = tokio::task::spawn_blocking(move || local::append_record(&path, record))
                    .await
                    .map_err(|e| SinkError::Io(format!("Task join error: {}", e)))?
                    .map_err(|e| SinkError::Io(format!("{:#}", e)))?;
                Ok(Some(SaveReceipt {
                    id: None,
                    saved_at: saved.saved_at,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PersistenceConfig;
    use crate::profile::types::sample_profile;
    use crate::scoring::run_simulation;
    use std::env;

    fn record() -> SimulationRecord {
        let profile = sample_profile();
        let projection = run_simulation(&profile);
        SimulationRecord::new("tester", profile, projection)
    }

    #[test]
    fn test_transient_errors() {
        assert!(SinkError::Transport("timeout".to_string()).is_transient());
        let rejected = |status| SinkError::Rejected {
            status,
            body: String::new(),
        };
        assert!(rejected(502).is_transient());
        assert!(rejected(429).is_transient());
        assert!(!rejected(400).is_transient());
        assert!(!SinkError::Io("disk full".to_string()).is_transient());
    }

    #[test]
    fn test_sink_from_config() {
        let mut config = Config::default();
        config.persistence = PersistenceConfig {
            sink: SinkKind::Local,
            history_path: Some("/tmp/history.json".to_string()),
            ..PersistenceConfig::default()
        };
        assert!(matches!(
            Sink::from_config(&config).unwrap(),
            Sink::Local(path) if path == PathBuf::from("/tmp/history.json")
        ));

        config.persistence.sink = SinkKind::None;
        assert!(matches!(Sink::from_config(&config).unwrap(), Sink::Disabled));

        config.persistence.sink = SinkKind::Remote;
        let err = Sink::from_config(&config).unwrap_err();
        assert!(matches!(err, SinkError::Config(_)));
        assert!(!err.is_transient());
        assert!(err.to_string().starts_with("Invalid persistence config"));
    }

    #[test]
    fn test_history_note_only_for_non_local_sinks() {
        assert!(Sink::history_note(SinkKind::Local).is_none());
        assert!(Sink::history_note(SinkKind::Remote)
            .is_some_and(|note| note.contains("kept locally")));
        assert!(Sink::history_note(SinkKind::None).is_some());
    }

    #[tokio::test]
    async fn test_disabled_sink_saves_nothing() {
        assert_eq!(Sink::Disabled.save(record()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_sink_stamps_record() {
        let path = env::temp_dir().join("credit_projector_test_sink_local.json");
        let _ = std::fs::remove_file(&path);

        let sink = Sink::Local(path.clone());
        let receipt = sink.save(record()).await.unwrap().unwrap();
        assert!(receipt.saved_at.is_some());

        let history = load_history(&path).unwrap();
        assert_eq!(history.records.len(), 1);
        assert_eq!(history.records[0].saved_at, receipt.saved_at);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_local_sink_failure_is_reported() {
        // A directory where the history file should be
        let path = env::temp_dir().join("credit_projector_test_sink_dir");
        std::fs::create_dir_all(&path).unwrap();

        let err = Sink::Local(path).save(record()).await.unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
