use super::types::{Profile, Scenario, PROGRAM_TIMELINES, UTILIZATION_BUCKETS};

pub fn check_fico_score(score: u32) -> Result<(), String> {
    if (300..=850).contains(&score) {
        Ok(())
    } else {
        Err(format!("fico_score: must be between 300 and 850 (got {})", score))
    }
}

/// Dollar amounts must be finite and non-negative.
pub fn check_amount(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        Err(format!("{}: must be a number", field))
    } else if value < 0.0 {
        Err(format!("{}: must be non-negative", field))
    } else {
        Ok(())
    }
}

pub fn check_utilization_bucket(bucket: u32) -> Result<(), String> {
    if UTILIZATION_BUCKETS.contains(&bucket) {
        Ok(())
    } else {
        Err(format!(
            "utilization_bucket: must be one of {:?} (got {})",
            UTILIZATION_BUCKETS, bucket
        ))
    }
}

pub fn check_accounts_enrolling(count: u32) -> Result<(), String> {
    if count >= 1 {
        Ok(())
    } else {
        Err("accounts_enrolling: at least one account must be enrolled".to_string())
    }
}

pub fn check_account_age(years: f64) -> Result<(), String> {
    check_amount("oldest_account_age_years", years)
}

pub fn check_program_timeline(months: u32) -> Result<(), String> {
    if PROGRAM_TIMELINES.contains(&months) {
        Ok(())
    } else {
        Err(format!(
            "program_timeline_months: must be one of {:?} (got {})",
            PROGRAM_TIMELINES, months
        ))
    }
}

pub fn check_months_in_program(scenario: Scenario, months: u32) -> Result<(), String> {
    match scenario {
        Scenario::NewClient if months > 0 => Err(
            "months_in_program: only applies to existing clients, leave it at 0".to_string(),
        ),
        _ => Ok(()),
    }
}

/// Validate a profile before it is simulated.
/// Returns all validation errors at once (not just the first).
pub fn validate_profile(profile: &Profile) -> Result<(), Vec<String>> {
    let checks = [
        check_fico_score(profile.fico_score),
        check_amount("total_debt", profile.total_debt),
        check_amount("monthly_income", profile.monthly_income),
        check_utilization_bucket(profile.utilization_bucket),
        check_accounts_enrolling(profile.accounts_enrolling),
        check_account_age(profile.oldest_account_age_years),
        check_program_timeline(profile.program_timeline_months),
        check_amount("total_credit_limit", profile.total_credit_limit),
        check_months_in_program(profile.scenario, profile.months_in_program),
    ];

    let errors: Vec<String> = checks.into_iter().filter_map(Result::err).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::sample_profile;

    #[test]
    fn test_valid_profile() {
        assert!(validate_profile(&sample_profile()).is_ok());
    }

    #[test]
    fn test_fico_out_of_range() {
        let mut profile = sample_profile();
        profile.fico_score = 900;
        let errors = validate_profile(&profile).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("fico_score"));

        profile.fico_score = 299;
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn test_fico_bounds_inclusive() {
        assert!(check_fico_score(300).is_ok());
        assert!(check_fico_score(850).is_ok());
    }

    #[test]
    fn test_negative_income() {
        let mut profile = sample_profile();
        profile.monthly_income = -1.0;
        let errors = validate_profile(&profile).unwrap_err();
        assert!(errors[0].contains("monthly_income: must be non-negative"));
    }

    #[test]
    fn test_nan_amount() {
        let mut profile = sample_profile();
        profile.total_debt = f64::NAN;
        let errors = validate_profile(&profile).unwrap_err();
        assert!(errors[0].contains("total_debt: must be a number"));
    }

    #[test]
    fn test_unknown_bucket_and_timeline() {
        let mut profile = sample_profile();
        profile.utilization_bucket = 40;
        profile.program_timeline_months = 18;
        let errors = validate_profile(&profile).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("utilization_bucket"));
        assert!(errors[1].starts_with("program_timeline_months"));
    }

    #[test]
    fn test_zero_accounts_enrolling() {
        let mut profile = sample_profile();
        profile.accounts_enrolling = 0;
        let errors = validate_profile(&profile).unwrap_err();
        assert!(errors[0].starts_with("accounts_enrolling"));
    }

    #[test]
    fn test_months_in_program_for_new_client() {
        let mut profile = sample_profile();
        profile.months_in_program = 6;
        assert!(validate_profile(&profile).is_err());

        profile.scenario = Scenario::ExistingClient;
        assert!(validate_profile(&profile).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut profile = sample_profile();
        profile.fico_score = 100; // Error 1
        profile.total_debt = -5.0; // Error 2
        profile.accounts_enrolling = 0; // Error 3
        let errors = validate_profile(&profile).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
