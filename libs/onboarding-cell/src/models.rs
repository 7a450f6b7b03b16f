// libs/onboarding-cell/src/models.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared minimum for the therapist bio, in characters.
pub const MIN_BIO_LEN: usize = 50;

// ==============================================================================
// WIZARD STEPS
// ==============================================================================

/// The five linear onboarding steps. Forward moves are guarded by that
/// step's validation only; backward moves are unconditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Personal,
    Credentials,
    Availability,
    Rates,
    Agreement,
}

impl OnboardingStep {
    pub fn number(&self) -> u8 {
        match self {
            OnboardingStep::Personal => 1,
            OnboardingStep::Credentials => 2,
            OnboardingStep::Availability => 3,
            OnboardingStep::Rates => 4,
            OnboardingStep::Agreement => 5,
        }
    }

    pub fn next(&self) -> Option<OnboardingStep> {
        match self {
            OnboardingStep::Personal => Some(OnboardingStep::Credentials),
            OnboardingStep::Credentials => Some(OnboardingStep::Availability),
            OnboardingStep::Availability => Some(OnboardingStep::Rates),
            OnboardingStep::Rates => Some(OnboardingStep::Agreement),
            OnboardingStep::Agreement => None,
        }
    }

    pub fn previous(&self) -> Option<OnboardingStep> {
        match self {
            OnboardingStep::Personal => None,
            OnboardingStep::Credentials => Some(OnboardingStep::Personal),
            OnboardingStep::Availability => Some(OnboardingStep::Credentials),
            OnboardingStep::Rates => Some(OnboardingStep::Availability),
            OnboardingStep::Agreement => Some(OnboardingStep::Rates),
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnboardingStep::Personal => write!(f, "personal"),
            OnboardingStep::Credentials => write!(f, "credentials"),
            OnboardingStep::Availability => write!(f, "availability"),
            OnboardingStep::Rates => write!(f, "rates"),
            OnboardingStep::Agreement => write!(f, "agreement"),
        }
    }
}

// ==============================================================================
// FORM BUFFER
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TherapistOnboardingForm {
    #[serde(default)]
    pub personal: PersonalDetails,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub rates: Rates,
    #[serde(default)]
    pub agreement: Agreement,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub full_name: String,
    pub phone: Option<String>,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub bio: String,
    pub license_number: String,
    pub years_experience: u32,
    pub specializations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rates {
    pub hourly_rate: f64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Agreement {
    pub terms_accepted: bool,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StepTransitionRequest {
    pub current_step: OnboardingStep,
    pub form: TherapistOnboardingForm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOnboardingRequest {
    pub form: TherapistOnboardingForm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUploadRequest {
    pub file_name: String,
    /// Data-URL encoded file content ("data:application/pdf;base64,...").
    pub file_data: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum OnboardingError {
    #[error("Validation failed")]
    ValidationFailed(Vec<String>),

    #[error("Terms must be accepted before submitting")]
    TermsNotAccepted,

    #[error("Submission is only available from the final step")]
    NotOnFinalStep,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}
