// libs/profile-cell/src/models.rs
use serde::{Deserialize, Serialize};

pub use shared_models::profile::Profile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarUploadRequest {
    /// Data-URL encoded image ("data:image/jpeg;base64,/9j/4AAQ...").
    pub file_data: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}
