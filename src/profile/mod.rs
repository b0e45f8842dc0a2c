pub mod types;
pub mod validation;

pub use types::{
    CreditTools, Profile, Scenario, UtilizationRange, PROGRAM_TIMELINES, UTILIZATION_BUCKETS,
};
pub use validation::validate_profile;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a profile from a YAML or JSON file.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
/// The profile is not validated here; call [`validate_profile`] before simulating.
pub fn load_profile(path: &Path) -> Result<Profile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile at {}", path.display()))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let profile = if is_json {
        serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse profile: invalid JSON in {}", path.display())
        })?
    } else {
        serde_saphyr::from_str(&content).with_context(|| {
            format!("Failed to parse profile: invalid YAML in {}", path.display())
        })?
    };

    Ok(profile)
}
