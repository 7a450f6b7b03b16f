use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{OnboardingError, OnboardingStep, TherapistOnboardingForm};
use crate::services::wizard;

/// Final onboarding submission. The profile and therapist-detail rows are
/// written by one server-side procedure so both commit or neither does;
/// there is no client-visible partial state to compensate for.
pub struct EnrollmentService {
    supabase: SupabaseClient,
}

impl EnrollmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn submit(
        &self,
        user_id: &str,
        form: &TherapistOnboardingForm,
        auth_token: &str,
    ) -> Result<Value, OnboardingError> {
        wizard::validate_submission(OnboardingStep::Agreement, form)
            .map_err(OnboardingError::ValidationFailed)?;

        debug!("Enrolling therapist {}", user_id);

        let availability: Vec<Value> = form
            .availability
            .iter()
            .map(|slot| {
                json!({
                    "day_of_week": slot.day_of_week,
                    "start_time": slot.start_time.format("%H:%M:%S").to_string(),
                    "end_time": slot.end_time.format("%H:%M:%S").to_string(),
                })
            })
            .collect();

        self.supabase
            .rpc(
                "enroll_therapist",
                auth_token,
                json!({
                    "p_user_id": user_id,
                    "p_full_name": form.personal.full_name.trim(),
                    "p_phone": form.personal.phone,
                    "p_timezone": form.personal.timezone,
                    "p_bio": form.credentials.bio.trim(),
                    "p_license_number": form.credentials.license_number.trim(),
                    "p_years_experience": form.credentials.years_experience,
                    "p_specializations": form.credentials.specializations,
                    "p_availability": availability,
                    "p_hourly_rate": form.rates.hourly_rate,
                    "p_currency": form.rates.currency,
                }),
            )
            .await
            .map_err(|e| OnboardingError::DatabaseError(e.to_string()))
    }
}
