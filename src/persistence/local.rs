use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::SimulationRecord;

const HISTORY_VERSION: u32 = 1;

/// Get the default history file path (~/.config/credit-projector/history.json)
pub fn get_history_path() -> PathBuf {
    crate::config::get_config_dir().join("history.json")
}

/// Saved simulations, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub version: u32,
    #[serde(default)]
    pub records: Vec<SimulationRecord>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            version: HISTORY_VERSION,
            records: Vec::new(),
        }
    }

    /// Most recent records first, at most `limit` of them.
    pub fn latest(&self, limit: usize) -> impl Iterator<Item = &SimulationRecord> {
        self.records.iter().rev().take(limit)
    }

    /// Records saved by one user, most recent first.
    pub fn for_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a SimulationRecord> {
        self.records.iter().rev().filter(move |r| r.user_id == user_id)
    }
}

/// Load history from a JSON file
///
/// If the file doesn't exist, returns an empty history.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_history(path: &Path) -> Result<History> {
    if !path.exists() {
        return Ok(History::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open history file at {}", path.display()))?;

    let history: History = serde_json::from_reader(file).context("Failed to load history")?;

    if history.version != HISTORY_VERSION {
        anyhow::bail!("Unsupported history version: {}", history.version);
    }

    Ok(history)
}

/// Save history to a JSON file atomically
///
/// The file is never left half-written. Creates the parent directory if needed.
pub fn save_history(path: &Path, history: &History) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, history).context("Failed to serialize history")?;

    file.commit().context("Failed to save history")?;

    Ok(())
}

/// Stamp a record with the store's clock and append it to the history file.
pub fn append_record(path: &Path, mut record: SimulationRecord) -> Result<SimulationRecord> {
    let mut history = load_history(path)?;
    record.saved_at = Some(Utc::now());
    history.records.push(record.clone());
    save_history(path, &history)?;
    Ok(record)
}
