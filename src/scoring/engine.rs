use serde::{Deserialize, Serialize};

use super::impact::worst_case_impact;
use super::weights::{derive_weights, round_to, WeightVector};
use crate::profile::{Profile, Scenario};

pub const MIN_SCORE: i32 = 300;
pub const MAX_SCORE: i32 = 850;

/// Share of enrolled debt the program is expected to settle away.
const SETTLEMENT_RATE: f64 = 0.55;
/// Monthly payment on remaining debt, as a fraction of the yearly balance.
const POST_PROGRAM_PAYMENT_RATE: f64 = 0.05;
const MAX_POST_PROGRAM_DTI_PCT: f64 = 50.0;

const SECURED_CARD_GAIN: f64 = 30.0;
const CREDIT_BUILDER_GAIN: f64 = 25.0;
const AUTHORIZED_USER_GAIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Milestones {
    pub dip: i32,
    pub stabilization: i32,
    pub recovery: i32,
}

/// Where the projected gain comes from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GainBreakdown {
    pub utilization: f64,
    pub payment_history: f64,
    pub account_age: f64,
    pub tools: f64,
    pub total: f64,
}

/// Result of one simulation run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Projection {
    pub initial_score: i32,
    pub low_point_score: i32,
    pub projected_score: i32,
    pub score_gain: i32,
    pub recovery_months: u32,
    pub post_program_dti_pct: f64,
    pub estimated_savings_usd: f64,
    /// Always 0 for existing clients.
    pub impact_penalty: u32,
    pub milestones: Milestones,
    pub weights: WeightVector,
    pub gains: GainBreakdown,
}

/// Project the score trajectory for a profile.
///
/// Deterministic: the same profile always yields the same projection. Inputs
/// are expected to have passed [`crate::profile::validate_profile`]; out of
/// range values are clamped rather than rejected.
pub fn run_simulation(profile: &Profile) -> Projection {
    let initial_score = if profile.fico_score > 300 {
        profile.fico_score as i32
    } else {
        500
    };

    let weights = derive_weights(profile);

    let (impact_penalty, low_point, recovery_months) = match profile.scenario {
        Scenario::NewClient => {
            let penalty = worst_case_impact(profile, &weights);
            let low = (initial_score - penalty as i32).max(MIN_SCORE);
            (penalty, low, profile.program_timeline_months)
        }
        Scenario::ExistingClient => {
            let remaining = profile
                .program_timeline_months
                .saturating_sub(profile.months_in_program);
            (0, initial_score, remaining.max(12))
        }
    };
    let low_point_score = low_point.clamp(MIN_SCORE, MAX_SCORE);

    let gains = potential_gain(profile, &weights, recovery_months);
    let projected_score =
        ((low_point_score as f64 + gains.total).round() as i32).clamp(MIN_SCORE, MAX_SCORE);

    let estimated_savings_usd = profile.total_debt * SETTLEMENT_RATE;
    let post_program_dti_pct = post_program_dti(profile, estimated_savings_usd);

    Projection {
        initial_score,
        low_point_score,
        projected_score,
        score_gain: projected_score - initial_score,
        recovery_months,
        post_program_dti_pct,
        estimated_savings_usd,
        impact_penalty,
        milestones: milestones(initial_score, low_point_score, projected_score),
        weights,
        gains,
    }
}

fn potential_gain(
    profile: &Profile,
    weights: &WeightVector,
    recovery_months: u32,
) -> GainBreakdown {
    let horizon = recovery_months as f64 / 36.0;

    let utilization = weights.utilization * 250.0;
    let payment_history = weights.payment_history * 150.0 * horizon;
    let account_age = weights.account_age * 50.0 * horizon;

    let mut tools = 0.0;
    if profile.tools.secured_card {
        tools += SECURED_CARD_GAIN;
    }
    if profile.tools.credit_builder {
        tools += CREDIT_BUILDER_GAIN;
    }
    if profile.tools.authorized_user {
        tools += AUTHORIZED_USER_GAIN;
    }

    GainBreakdown {
        utilization,
        payment_history,
        account_age,
        tools,
        total: utilization + payment_history + account_age + tools,
    }
}

/// Monthly payment on the post-settlement balance as a share of income,
/// one decimal place, within [0, 50]. Zero when there is no income.
fn post_program_dti(profile: &Profile, savings: f64) -> f64 {
    if profile.monthly_income <= 0.0 {
        return 0.0;
    }
    let remaining_debt = profile.total_debt - savings;
    let monthly_payment = remaining_debt * POST_PROGRAM_PAYMENT_RATE / 12.0;
    let pct = monthly_payment / profile.monthly_income * 100.0;
    round_to(pct.clamp(0.0, MAX_POST_PROGRAM_DTI_PCT), 1)
}

fn milestones(initial: i32, low_point: i32, projected: i32) -> Milestones {
    // A flat projection still gets a non-zero span for chart scaling
    let span = match projected - low_point {
        0 => 1.0,
        s => s as f64,
    };

    Milestones {
        dip: low_point,
        stabilization: initial.min(low_point + (span * 0.15).round() as i32),
        recovery: (low_point + (span * 0.65).round() as i32).min(MAX_SCORE),
    }
}
