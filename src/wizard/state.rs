use crate::profile::validation::{
    check_account_age, check_accounts_enrolling, check_amount, check_fico_score,
    check_months_in_program, check_program_timeline, check_utilization_bucket,
};
use crate::profile::{validate_profile, CreditTools, Profile, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Scenario,
    Finances,
    History,
    Program,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Scenario, Step::Finances, Step::History, Step::Program];

    pub fn title(&self) -> &'static str {
        match self {
            Step::Scenario => "Your situation",
            Step::Finances => "Debt and income",
            Step::History => "Credit history",
            Step::Program => "Program and tools",
        }
    }

    /// 1-based position, for "Step 2 of 4" style headings.
    pub fn number(&self) -> usize {
        match self {
            Step::Scenario => 1,
            Step::Finances => 2,
            Step::History => 3,
            Step::Program => 4,
        }
    }

    fn next(&self) -> Option<Step> {
        Step::ALL.get(self.number()).copied()
    }

    fn prev(&self) -> Option<Step> {
        self.number().checked_sub(2).and_then(|i| Step::ALL.get(i).copied())
    }
}

/// Answers collected so far. Anything may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub scenario: Option<Scenario>,
    pub fico_score: Option<u32>,
    pub months_in_program: Option<u32>,
    pub total_debt: Option<f64>,
    pub monthly_income: Option<f64>,
    pub total_credit_limit: Option<f64>,
    pub utilization_bucket: Option<u32>,
    pub accounts_enrolling: Option<u32>,
    pub positive_accounts: Option<u32>,
    pub oldest_account_age_years: Option<f64>,
    pub program_timeline_months: Option<u32>,
    pub tools: CreditTools,
}

impl From<&Profile> for ProfileDraft {
    fn from(p: &Profile) -> Self {
        Self {
            scenario: Some(p.scenario),
            fico_score: Some(p.fico_score),
            months_in_program: Some(p.months_in_program),
            total_debt: Some(p.total_debt),
            monthly_income: Some(p.monthly_income),
            total_credit_limit: Some(p.total_credit_limit),
            utilization_bucket: Some(p.utilization_bucket),
            accounts_enrolling: Some(p.accounts_enrolling),
            positive_accounts: Some(p.positive_accounts),
            oldest_account_age_years: Some(p.oldest_account_age_years),
            program_timeline_months: Some(p.program_timeline_months),
            tools: p.tools,
        }
    }
}

impl ProfileDraft {
    fn build(&self) -> Option<Profile> {
        let scenario = self.scenario?;
        Some(Profile {
            fico_score: self.fico_score?,
            total_debt: self.total_debt?,
            monthly_income: self.monthly_income?,
            utilization_bucket: self.utilization_bucket?,
            accounts_enrolling: self.accounts_enrolling?,
            positive_accounts: self.positive_accounts.unwrap_or(0),
            oldest_account_age_years: self.oldest_account_age_years?,
            program_timeline_months: self.program_timeline_months?,
            total_credit_limit: self.total_credit_limit.unwrap_or(0.0),
            scenario,
            months_in_program: match scenario {
                Scenario::NewClient => 0,
                Scenario::ExistingClient => self.months_in_program?,
            },
            tools: self.tools,
        })
    }
}

fn required<T: Copy>(
    field: &str,
    value: Option<T>,
    check: impl Fn(T) -> Result<(), String>,
) -> Option<String> {
    match value {
        None => Some(format!("{}: required", field)),
        Some(v) => check(v).err(),
    }
}

fn step_errors(step: Step, d: &ProfileDraft) -> Vec<String> {
    let errors = match step {
        Step::Scenario => {
            let mut errors = vec![
                required("scenario", d.scenario, |_| Ok(())),
                required("fico_score", d.fico_score, check_fico_score),
            ];
            if let Some(scenario) = d.scenario {
                errors.push(match scenario {
                    Scenario::ExistingClient => {
                        required("months_in_program", d.months_in_program, |m| {
                            check_months_in_program(scenario, m)
                        })
                    }
                    Scenario::NewClient => check_months_in_program(
                        scenario,
                        d.months_in_program.unwrap_or(0),
                    )
                    .err(),
                });
            }
            errors
        }
        Step::Finances => vec![
            required("total_debt", d.total_debt, |v| check_amount("total_debt", v)),
            required("monthly_income", d.monthly_income, |v| check_amount("monthly_income", v)),
            d.total_credit_limit.and_then(|v| check_amount("total_credit_limit", v).err()),
            required("utilization_bucket", d.utilization_bucket, check_utilization_bucket),
        ],
        Step::History => vec![
            required("accounts_enrolling", d.accounts_enrolling, check_accounts_enrolling),
            required("oldest_account_age_years", d.oldest_account_age_years, check_account_age),
        ],
        Step::Program => vec![required(
            "program_timeline_months",
            d.program_timeline_months,
            check_program_timeline,
        )],
    };
    errors.into_iter().flatten().collect()
}

/// Four-step input flow. Moving forward requires the current step to validate.
#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    pub draft: ProfileDraft,
    errors: Vec<String>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::with_draft(ProfileDraft::default())
    }

    /// Start from existing answers, e.g. a previously saved profile.
    pub fn with_draft(draft: ProfileDraft) -> Self {
        Self {
            step: Step::Scenario,
            draft,
            errors: Vec::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Validation errors from the last rejected transition.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_last_step(&self) -> bool {
        self.step.next().is_none()
    }

    /// Move to the next step if the current one validates.
    /// Returns false (and records errors) when the step is incomplete or on the last step.
    pub fn advance(&mut self) -> bool {
        self.errors = step_errors(self.step, &self.draft);
        if !self.errors.is_empty() {
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Go back one step. Answers are kept.
    pub fn back(&mut self) -> bool {
        self.errors.clear();
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    /// Produce the profile. Only allowed from the last step, and only when every
    /// step validates; otherwise the wizard moves to the first failing step.
    pub fn finish(&mut self) -> Result<Profile, Vec<String>> {
        if !self.is_last_step() {
            self.errors = vec![format!(
                "finish the remaining steps first (currently on step {} of {})",
                self.step.number(),
                Step::ALL.len()
            )];
            return Err(self.errors.clone());
        }

        for step in Step::ALL {
            let errors = step_errors(step, &self.draft);
            if !errors.is_empty() {
                self.step = step;
                self.errors = errors.clone();
                return Err(errors);
            }
        }

        let Some(profile) = self.draft.build() else {
            self.errors = vec!["profile is incomplete".to_string()];
            return Err(self.errors.clone());
        };

        if let Err(errors) = validate_profile(&profile) {
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors.clear();
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::sample_profile;

    fn complete_draft() -> ProfileDraft {
        ProfileDraft::from(&sample_profile())
    }

    #[test]
    fn test_step_order() {
        assert_eq!(Step::Scenario.next(), Some(Step::Finances));
        assert_eq!(Step::Program.next(), None);
        assert_eq!(Step::Scenario.prev(), None);
        assert_eq!(Step::Program.prev(), Some(Step::History));
    }

    #[test]
    fn test_advance_blocked_by_missing_fields() {
        let mut wizard = Wizard::new();
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), Step::Scenario);
        assert_eq!(
            wizard.errors(),
            &["scenario: required".to_string(), "fico_score: required".to_string()]
        );
    }

    #[test]
    fn test_advance_only_checks_current_step() {
        let mut wizard = Wizard::new();
        wizard.draft.scenario = Some(Scenario::NewClient);
        wizard.draft.fico_score = Some(640);

        assert!(wizard.advance());
        assert_eq!(wizard.step(), Step::Finances);
        assert!(wizard.errors().is_empty());

        // Finances not filled in yet
        assert!(!wizard.advance());
        assert_eq!(wizard.errors().len(), 3);
    }

    #[test]
    fn test_existing_client_needs_months_in_program() {
        let mut wizard = Wizard::new();
        wizard.draft.scenario = Some(Scenario::ExistingClient);
        wizard.draft.fico_score = Some(700);
        assert!(!wizard.advance());
        assert!(wizard.errors()[0].starts_with("months_in_program"));

        wizard.draft.months_in_program = Some(10);
        assert!(wizard.advance());
    }

    #[test]
    fn test_invalid_value_reported_per_field() {
        let mut wizard = Wizard::new();
        wizard.draft.scenario = Some(Scenario::NewClient);
        wizard.draft.fico_score = Some(900);
        assert!(!wizard.advance());
        assert_eq!(wizard.errors().len(), 1);
        assert!(wizard.errors()[0].starts_with("fico_score: must be between"));
    }

    #[test]
    fn test_back_keeps_answers() {
        let mut wizard = Wizard::with_draft(complete_draft());
        assert!(wizard.advance());
        assert!(wizard.back());
        assert_eq!(wizard.step(), Step::Scenario);
        assert!(!wizard.back());
        assert_eq!(wizard.draft, complete_draft());
    }

    #[test]
    fn test_finish_from_last_step() {
        let mut wizard = Wizard::with_draft(complete_draft());
        while wizard.advance() {}
        assert!(wizard.is_last_step());
        assert_eq!(wizard.finish().unwrap(), sample_profile());
    }

    #[test]
    fn test_finish_refused_before_last_step() {
        let mut wizard = Wizard::with_draft(complete_draft());
        assert!(wizard.finish().is_err());
        assert_eq!(wizard.step(), Step::Scenario);
    }

    #[test]
    fn test_finish_jumps_to_first_invalid_step() {
        let mut wizard = Wizard::with_draft(complete_draft());
        while wizard.advance() {}

        wizard.draft.total_debt = Some(-1.0);
        let errors = wizard.finish().unwrap_err();
        assert_eq!(wizard.step(), Step::Finances);
        assert!(errors[0].starts_with("total_debt"));
    }
}
