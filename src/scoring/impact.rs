use super::weights::WeightVector;
use crate::profile::Profile;

pub const MIN_IMPACT: f64 = 20.0;
pub const MAX_IMPACT: f64 = 150.0;

/// Expected score drop for a new client before debt resolution starts.
///
/// Lower current utilization and higher scores mean more to lose; positive
/// accounts and a long credit history cushion the drop. Always in [20, 150].
pub fn worst_case_impact(profile: &Profile, weights: &WeightVector) -> u32 {
    let utilization_factor = ((100.0 - profile.utilization_bucket as f64) / 10.0).max(0.0);
    let mut drop = utilization_factor * 5.0 * (weights.utilization * 2.0);

    let severity_factor = ((profile.fico_score as f64 - 500.0) / 20.0).max(0.0);
    drop += severity_factor * 5.0;

    drop -= profile.positive_accounts as f64 * 10.0;

    if profile.oldest_account_age_years > 10.0 {
        drop -= 15.0;
    }

    drop.clamp(MIN_IMPACT, MAX_IMPACT).round() as u32
}
