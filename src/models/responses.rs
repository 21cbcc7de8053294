use serde::{Deserialize, Serialize};
use crate::models::domain::{FilteredCandidate, UserProfile};
use crate::services::CacheStats;

/// Profile echo included in recommendation responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub age: u32,
    pub occupation: Option<String>,
    pub state: Option<String>,
    pub caste_group: Option<String>,
    pub interests: Vec<String>,
}

impl From<&UserProfile> for ProfileSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            age: profile.age,
            occupation: profile.occupation.clone(),
            state: profile.state.clone(),
            caste_group: profile.caste_group.clone(),
            interests: profile.interests.clone(),
        }
    }
}

/// Response for the recommendation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub message: String,
    pub request_id: String,
    pub recommendations: Vec<FilteredCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<ProfileSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    pub total_recommendations: usize,
    pub filtered_out: usize,
}

/// Scorer availability details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub is_available: bool,
    pub backend: String,
    pub location: String,
}

/// Response for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub service_status: String,
    pub model_info: ModelInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(rename = "isProfileComplete", skip_serializing_if = "Option::is_none")]
    pub is_profile_complete: Option<bool>,
    #[serde(rename = "modelInfo", skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfo>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
            is_profile_complete: None,
            model_info: None,
        }
    }
}
