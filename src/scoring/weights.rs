use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Relative importance of the five credit score components.
///
/// Produced by [`derive_weights`]; the normalized form sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WeightVector {
    pub payment_history: f64,
    pub utilization: f64,
    pub account_age: f64,
    pub credit_mix: f64,
    pub new_credit: f64,
}

impl WeightVector {
    pub const BASE: WeightVector = WeightVector {
        payment_history: 0.35,
        utilization: 0.30,
        account_age: 0.15,
        credit_mix: 0.10,
        new_credit: 0.10,
    };

    pub fn components(&self) -> [f64; 5] {
        [
            self.payment_history,
            self.utilization,
            self.account_age,
            self.credit_mix,
            self.new_credit,
        ]
    }

    fn from_components(c: [f64; 5]) -> Self {
        Self {
            payment_history: c[0],
            utilization: c[1],
            account_age: c[2],
            credit_mix: c[3],
            new_credit: c[4],
        }
    }

    pub fn sum(&self) -> f64 {
        self.components().iter().sum()
    }

    /// Scale to a total of 1.0 with every component rounded to 4 decimals.
    ///
    /// The rounding residual goes to the largest component (first on ties),
    /// so the rounded components still add up to exactly 1.0000.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 {
            return Self::BASE;
        }

        let mut c = self.components().map(|v| round_to(v / total, 4));
        let residual = round_to(1.0 - c.iter().sum::<f64>(), 4);
        if residual != 0.0 {
            let mut largest = 0;
            for (i, v) in c.iter().enumerate() {
                if *v > c[largest] {
                    largest = i;
                }
            }
            c[largest] = round_to(c[largest] + residual, 4);
        }
        Self::from_components(c)
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::BASE
    }
}

/// One weight adjustment that fired while deriving weights.
#[derive(Debug, Clone)]
pub struct WeightStep {
    pub label: &'static str,    // e.g. "Credit score band"
    pub description: String,    // e.g. "fico 780 >= 740: utilization-heavy profile"
    pub before: WeightVector,
    pub after: WeightVector,
}

#[derive(Debug, Clone)]
pub struct WeightBreakdown {
    pub raw: WeightVector,
    pub normalized: WeightVector,
    pub steps: Vec<WeightStep>,
}

type AdjustFn = fn(&Profile, WeightVector) -> Option<(WeightVector, String)>;

// Order matters: each step reads the previous step's clamped output.
const STEPS: [(&str, AdjustFn); 5] = [
    ("Credit score band", adjust_for_score_band),
    ("Debt-to-income", adjust_for_debt_to_income),
    ("Overall utilization", adjust_for_overall_utilization),
    ("Positive accounts", adjust_for_positive_accounts),
    ("Account age", adjust_for_account_age),
];

/// Derive normalized component weights for a profile.
pub fn derive_weights(profile: &Profile) -> WeightVector {
    explain_weights(profile).normalized
}

/// Derive weights and keep a record of each adjustment that applied.
pub fn explain_weights(profile: &Profile) -> WeightBreakdown {
    let mut weights = WeightVector::BASE;
    let mut steps = Vec::new();

    for (label, adjust) in STEPS {
        if let Some((after, description)) = adjust(profile, weights) {
            steps.push(WeightStep {
                label,
                description,
                before: weights,
                after,
            });
            weights = after;
        }
    }

    WeightBreakdown {
        raw: weights,
        normalized: weights.normalized(),
        steps,
    }
}

fn adjust_for_score_band(profile: &Profile, w: WeightVector) -> Option<(WeightVector, String)> {
    let fico = profile.fico_score;
    if fico >= 740 {
        Some((
            WeightVector {
                payment_history: 0.25,
                utilization: 0.40,
                account_age: 0.20,
                ..w
            },
            format!("fico {} >= 740: utilization and age matter more", fico),
        ))
    } else if fico <= 580 {
        Some((
            WeightVector {
                payment_history: 0.45,
                utilization: 0.25,
                new_credit: 0.15,
                ..w
            },
            format!("fico {} <= 580: payment history dominates", fico),
        ))
    } else {
        None
    }
}

fn adjust_for_debt_to_income(profile: &Profile, w: WeightVector) -> Option<(WeightVector, String)> {
    let dti = profile.debt_to_income();
    if dti <= 0.45 {
        return None;
    }
    Some((
        WeightVector {
            utilization: (w.utilization + 0.05).min(0.45),
            payment_history: (w.payment_history - 0.05).max(0.25),
            ..w
        },
        format!("debt-to-income {:.2} > 0.45", dti),
    ))
}

fn adjust_for_overall_utilization(
    profile: &Profile,
    w: WeightVector,
) -> Option<(WeightVector, String)> {
    let pct = profile.overall_utilization_pct()?;
    if pct >= 30.0 {
        return None;
    }
    Some((
        WeightVector {
            utilization: (w.utilization - 0.05).max(0.20),
            ..w
        },
        format!("overall utilization {:.1}% < 30%", pct),
    ))
}

fn adjust_for_positive_accounts(
    profile: &Profile,
    w: WeightVector,
) -> Option<(WeightVector, String)> {
    if profile.positive_accounts == 0 {
        return None;
    }
    Some((
        WeightVector {
            payment_history: (w.payment_history - 0.05).max(0.30),
            credit_mix: (w.credit_mix + 0.05).min(0.20),
            ..w
        },
        format!("{} positive account(s) kept open", profile.positive_accounts),
    ))
}

fn adjust_for_account_age(profile: &Profile, w: WeightVector) -> Option<(WeightVector, String)> {
    let age = profile.oldest_account_age_years;
    if age < 4.0 {
        Some((
            WeightVector {
                account_age: (w.account_age - 0.05).max(0.05),
                new_credit: (w.new_credit + 0.05).min(0.20),
                ..w
            },
            format!("oldest account {} years < 4", age),
        ))
    } else if age > 10.0 {
        Some((
            WeightVector {
                account_age: (w.account_age + 0.05).min(0.25),
                ..w
            },
            format!("oldest account {} years > 10", age),
        ))
    } else {
        None
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
