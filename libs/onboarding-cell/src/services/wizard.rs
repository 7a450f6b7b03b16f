use crate::models::{OnboardingStep, TherapistOnboardingForm, MIN_BIO_LEN};

/// Validate only the named step's fields, per the wizard contract: a
/// forward move is gated by the current step alone, never by later steps.
pub fn validate_step(step: OnboardingStep, form: &TherapistOnboardingForm) -> Vec<String> {
    let mut problems = Vec::new();

    match step {
        OnboardingStep::Personal => {
            if form.personal.full_name.trim().is_empty() {
                problems.push("full name is required".to_string());
            }
            if form.personal.timezone.trim().is_empty() {
                problems.push("timezone is required".to_string());
            }
        }
        OnboardingStep::Credentials => {
            if form.credentials.bio.trim().chars().count() < MIN_BIO_LEN {
                problems.push(format!("bio must be at least {} characters", MIN_BIO_LEN));
            }
            if form.credentials.license_number.trim().is_empty() {
                problems.push("license number is required".to_string());
            }
            if form.credentials.specializations.is_empty() {
                problems.push("at least one specialization is required".to_string());
            }
        }
        OnboardingStep::Availability => {
            if form.availability.is_empty() {
                problems.push("at least one availability slot is required".to_string());
            }
            for slot in &form.availability {
                if slot.day_of_week > 6 {
                    problems.push("day of week must be 0-6".to_string());
                }
                if slot.end_time <= slot.start_time {
                    problems.push("availability slot must end after it starts".to_string());
                }
            }
        }
        OnboardingStep::Rates => {
            if form.rates.hourly_rate <= 0.0 {
                problems.push("hourly rate must be positive".to_string());
            }
        }
        // The agreement checkbox gates submission, not navigation.
        OnboardingStep::Agreement => {}
    }

    problems
}

/// Advance from `current` if its fields validate. Returns the next step, or
/// the field problems blocking the move.
pub fn advance(
    current: OnboardingStep,
    form: &TherapistOnboardingForm,
) -> Result<OnboardingStep, Vec<String>> {
    let problems = validate_step(current, form);
    if !problems.is_empty() {
        return Err(problems);
    }

    Ok(current.next().unwrap_or(current))
}

/// Backward moves are unconditional; the first step stays put.
pub fn back(current: OnboardingStep) -> OnboardingStep {
    current.previous().unwrap_or(current)
}

/// Submission gate: reachable only from the final step, with every step
/// valid and the terms accepted.
pub fn validate_submission(
    current: OnboardingStep,
    form: &TherapistOnboardingForm,
) -> Result<(), Vec<String>> {
    if current != OnboardingStep::Agreement {
        return Err(vec!["submission is only available from the final step".to_string()]);
    }

    let mut problems: Vec<String> = [
        OnboardingStep::Personal,
        OnboardingStep::Credentials,
        OnboardingStep::Availability,
        OnboardingStep::Rates,
    ]
    .iter()
    .flat_map(|step| validate_step(*step, form))
    .collect();

    if !form.agreement.terms_accepted {
        problems.push("terms must be accepted".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AvailabilitySlot;
    use chrono::NaiveTime;

    fn complete_form() -> TherapistOnboardingForm {
        let mut form = TherapistOnboardingForm::default();
        form.personal.full_name = "Dana Rivers".to_string();
        form.personal.timezone = "Europe/London".to_string();
        form.credentials.bio = "a".repeat(MIN_BIO_LEN);
        form.credentials.license_number = "LIC-0042".to_string();
        form.credentials.years_experience = 6;
        form.credentials.specializations = vec!["CBT".to_string()];
        form.availability = vec![AvailabilitySlot {
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }];
        form.rates.hourly_rate = 80.0;
        form.agreement.terms_accepted = true;
        form
    }

    #[test]
    fn bio_of_49_blocks_credentials_step() {
        let mut form = complete_form();
        form.credentials.bio = "b".repeat(MIN_BIO_LEN - 1);

        let result = advance(OnboardingStep::Credentials, &form);
        assert!(result.is_err());
    }

    #[test]
    fn bio_of_50_allows_credentials_step() {
        let mut form = complete_form();
        form.credentials.bio = "b".repeat(MIN_BIO_LEN);

        let result = advance(OnboardingStep::Credentials, &form);
        assert_eq!(result, Ok(OnboardingStep::Availability));
    }

    #[test]
    fn advancement_checks_only_the_current_step() {
        let mut form = complete_form();
        // Later steps are invalid, but step 1 validates on its own fields.
        form.rates.hourly_rate = 0.0;
        form.availability.clear();

        let result = advance(OnboardingStep::Personal, &form);
        assert_eq!(result, Ok(OnboardingStep::Credentials));
    }

    #[test]
    fn back_is_unconditional_even_with_invalid_fields() {
        let form = TherapistOnboardingForm::default();
        assert_eq!(back(OnboardingStep::Rates), OnboardingStep::Availability);
        // Emptiness of the form never matters for a backward move.
        assert!(!validate_step(OnboardingStep::Rates, &form).is_empty());
    }

    #[test]
    fn back_from_first_step_stays() {
        assert_eq!(back(OnboardingStep::Personal), OnboardingStep::Personal);
    }

    #[test]
    fn submit_requires_final_step() {
        let form = complete_form();
        assert!(validate_submission(OnboardingStep::Rates, &form).is_err());
        assert!(validate_submission(OnboardingStep::Agreement, &form).is_ok());
    }

    #[test]
    fn submit_requires_terms_accepted() {
        let mut form = complete_form();
        form.agreement.terms_accepted = false;

        let result = validate_submission(OnboardingStep::Agreement, &form);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .iter()
            .any(|p| p.contains("terms")));
    }

    #[test]
    fn inverted_availability_slot_blocks_step() {
        let mut form = complete_form();
        form.availability[0].end_time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        let result = advance(OnboardingStep::Availability, &form);
        assert!(result.is_err());
    }
}
