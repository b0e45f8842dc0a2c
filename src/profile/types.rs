use serde::{Deserialize, Serialize};

/// Utilization bucket values accepted in a profile (representative midpoints).
pub const UTILIZATION_BUCKETS: [u32; 5] = [30, 50, 70, 90, 100];

/// Program lengths offered, in months.
pub const PROGRAM_TIMELINES: [u32; 5] = [12, 24, 36, 48, 60];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Not yet enrolled; the projection models the enrollment dip.
    NewClient,
    /// Already in the program for `months_in_program` months.
    ExistingClient,
}

impl Scenario {
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::NewClient => "New client",
            Scenario::ExistingClient => "Existing client",
        }
    }
}

/// Credit building tools the client uses alongside the program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreditTools {
    #[serde(default)]
    pub secured_card: bool,
    #[serde(default)]
    pub credit_builder: bool,
    #[serde(default)]
    pub authorized_user: bool,
}

/// Credit profile collected from the user.
///
/// Example YAML:
/// ```yaml
/// fico_score: 650
/// total_debt: 20000
/// monthly_income: 4000
/// utilization_bucket: 70
/// accounts_enrolling: 3
/// positive_accounts: 1
/// oldest_account_age_years: 5
/// program_timeline_months: 36
/// total_credit_limit: 25000
/// scenario: new_client
/// tools:
///   secured_card: true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub fico_score: u32,
    /// USD
    pub total_debt: f64,
    /// USD
    pub monthly_income: f64,
    pub utilization_bucket: u32,
    pub accounts_enrolling: u32,
    #[serde(default)]
    pub positive_accounts: u32,
    pub oldest_account_age_years: f64,
    pub program_timeline_months: u32,
    #[serde(default)]
    pub total_credit_limit: f64,
    pub scenario: Scenario,
    /// Only meaningful for `ExistingClient`.
    #[serde(default)]
    pub months_in_program: u32,
    #[serde(default)]
    pub tools: CreditTools,
}

impl Profile {
    /// Yearly debt-to-income ratio. Treated as 1.0 when there is no income.
    pub fn debt_to_income(&self) -> f64 {
        if self.monthly_income > 0.0 {
            self.total_debt / (self.monthly_income * 12.0)
        } else {
            1.0
        }
    }

    /// Overall utilization percentage, or None without a credit limit.
    pub fn overall_utilization_pct(&self) -> Option<f64> {
        if self.total_credit_limit > 0.0 {
            Some(self.total_debt / self.total_credit_limit * 100.0)
        } else {
            None
        }
    }
}

/// Utilization ranges offered by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationRange {
    Under30,
    From30To50,
    From50To70,
    From70To90,
    Over90,
}

impl UtilizationRange {
    pub const ALL: [UtilizationRange; 5] = [
        UtilizationRange::Under30,
        UtilizationRange::From30To50,
        UtilizationRange::From50To70,
        UtilizationRange::From70To90,
        UtilizationRange::Over90,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UtilizationRange::Under30 => "Under 30%",
            UtilizationRange::From30To50 => "30% - 50%",
            UtilizationRange::From50To70 => "50% - 70%",
            UtilizationRange::From70To90 => "70% - 90%",
            UtilizationRange::Over90 => "Over 90%",
        }
    }

    /// Representative bucket value stored in the profile.
    pub fn bucket(&self) -> u32 {
        match self {
            UtilizationRange::Under30 => 30,
            UtilizationRange::From30To50 => 50,
            UtilizationRange::From50To70 => 70,
            UtilizationRange::From70To90 => 90,
            UtilizationRange::Over90 => 100,
        }
    }

    pub fn from_bucket(bucket: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.bucket() == bucket)
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> Profile {
    Profile {
        fico_score: 650,
        total_debt: 20000.0,
        monthly_income: 4000.0,
        utilization_bucket: 70,
        accounts_enrolling: 3,
        positive_accounts: 1,
        oldest_account_age_years: 5.0,
        program_timeline_months: 36,
        total_credit_limit: 25000.0,
        scenario: Scenario::NewClient,
        months_in_program: 0,
        tools: CreditTools::default(),
    }
}
