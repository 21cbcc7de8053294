use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::models::domain::UserProfile;

/// Request for a full recommendation run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    pub profile: UserProfile,
    #[validate(range(min = 1, max = 50, message = "top_k must be between 1 and 50"))]
    #[serde(default = "default_top_k", alias = "topK")]
    pub top_k: u16,
}

/// Request for quick recommendations from a partial profile
///
/// `age` may be a number or a numeric string. Missing or empty values fall
/// back to a default when the profile is built; present but unusable values
/// fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuickRecommendRequest {
    #[validate(custom(function = "validate_quick_age"))]
    #[serde(default)]
    pub age: Option<serde_json::Value>,
    #[validate(custom(function = "validate_not_blank"))]
    #[serde(default)]
    pub occupation: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[validate(range(min = 1, max = 20, message = "top_k must be between 1 and 20"))]
    #[serde(default = "default_top_k", alias = "topK")]
    pub top_k: u16,
}

pub const QUICK_DEFAULT_AGE: u32 = 25;
pub const QUICK_MIN_AGE: u32 = 18;
pub const QUICK_MAX_AGE: u32 = 100;
pub const QUICK_DEFAULT_OCCUPATION: &str = "Student";
pub const QUICK_DEFAULT_STATE: &str = "Karnataka";
pub const QUICK_DEFAULT_INTEREST: &str = "education";

impl QuickRecommendRequest {
    /// Build the minimal profile used for quick recommendations
    pub fn to_profile(&self) -> UserProfile {
        let age = self
            .age
            .as_ref()
            .and_then(parse_age)
            .filter(|a| (QUICK_MIN_AGE..=QUICK_MAX_AGE).contains(a))
            .unwrap_or(QUICK_DEFAULT_AGE);

        let interests: Vec<String> = self
            .interests
            .iter()
            .flatten()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();

        UserProfile {
            age,
            income: Some(0.0),
            caste_group: Some("General".to_string()),
            occupation: Some(non_blank_or(&self.occupation, QUICK_DEFAULT_OCCUPATION)),
            gender: Some("other".to_string()),
            state: Some(non_blank_or(&self.state, QUICK_DEFAULT_STATE)),
            interests: if interests.is_empty() {
                vec![QUICK_DEFAULT_INTEREST.to_string()]
            } else {
                interests
            },
            previous_applications: Vec::new(),
        }
    }
}

fn parse_age(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_empty_age(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_quick_age(value: &serde_json::Value) -> Result<(), ValidationError> {
    if is_empty_age(value) {
        return Ok(());
    }

    match parse_age(value) {
        Some(age) if (QUICK_MIN_AGE..=QUICK_MAX_AGE).contains(&age) => Ok(()),
        _ => Err(validation_error("age_range", "Age must be between 18 and 100")),
    }
}

/// Empty strings mean "use the default"; whitespace-only strings are rejected
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.trim().is_empty() {
        return Err(validation_error("blank", "Value cannot be blank"));
    }
    Ok(())
}

fn non_blank_or(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn default_top_k() -> u16 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_profile_defaults() {
        let profile = QuickRecommendRequest::default().to_profile();

        assert_eq!(profile.age, 25);
        assert_eq!(profile.occupation.as_deref(), Some("Student"));
        assert_eq!(profile.state.as_deref(), Some("Karnataka"));
        assert_eq!(profile.interests, vec!["education"]);
        assert_eq!(profile.caste_group.as_deref(), Some("General"));
        assert_eq!(profile.gender.as_deref(), Some("other"));
    }

    #[test]
    fn test_quick_profile_uses_valid_values() {
        let request: QuickRecommendRequest = serde_json::from_str(
            r#"{"age": "42", "occupation": " Farmer ", "interests": ["", "agriculture"]}"#,
        )
        .unwrap();
        let profile = request.to_profile();

        assert_eq!(profile.age, 42);
        assert_eq!(profile.occupation.as_deref(), Some("Farmer"));
        assert_eq!(profile.interests, vec!["agriculture"]);
    }

    #[test]
    fn test_quick_profile_rejects_out_of_range_age() {
        for body in [r#"{"age": 12}"#, r#"{"age": 101}"#, r#"{"age": "abc"}"#, r#"{"age": true}"#] {
            let request: QuickRecommendRequest = serde_json::from_str(body).unwrap();
            assert!(request.validate().is_err(), "accepted {}", body);
        }
    }

    #[test]
    fn test_quick_empty_values_use_defaults() {
        let request: QuickRecommendRequest =
            serde_json::from_str(r#"{"age": "", "occupation": "", "state": null}"#).unwrap();

        assert!(request.validate().is_ok());
        let profile = request.to_profile();
        assert_eq!(profile.age, 25);
        assert_eq!(profile.occupation.as_deref(), Some("Student"));
        assert_eq!(profile.state.as_deref(), Some("Karnataka"));
    }

    #[test]
    fn test_quick_blank_occupation_is_invalid() {
        let request: QuickRecommendRequest =
            serde_json::from_str(r#"{"occupation": "   "}"#).unwrap();
        assert!(request.validate().is_err());

        let request: QuickRecommendRequest = serde_json::from_str(r#"{"state": "  "}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_quick_interests_must_be_an_array() {
        let result = serde_json::from_str::<QuickRecommendRequest>(r#"{"interests": "education"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_top_k_validation() {
        let request: RecommendRequest =
            serde_json::from_str(r#"{"profile": {}, "top_k": 80}"#).unwrap();
        assert!(request.validate().is_err());

        let request: RecommendRequest = serde_json::from_str(r#"{"profile": {}}"#).unwrap();
        assert_eq!(request.top_k, 10);
        assert!(request.validate().is_ok());
    }
}
