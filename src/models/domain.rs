use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scheme recommendation as emitted by the scorer
///
/// Only the name, eligibility text and hybrid score are interpreted; every
/// other field the scorer returns is kept in `extra` and serialized back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "scheme_name", alias = "name", default)]
    pub name: String,
    #[serde(
        rename = "eligibility",
        alias = "eligibilityText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub eligibility_text: Option<String>,
    #[serde(
        rename = "score_hybrid",
        alias = "hybridScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hybrid_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, eligibility_text: impl Into<String>, hybrid_score: Option<f64>) -> Self {
        Self {
            name: name.into(),
            eligibility_text: Some(eligibility_text.into()),
            hybrid_score,
            extra: Map::new(),
        }
    }

    /// Eligibility text, empty when absent
    pub fn eligibility(&self) -> &str {
        self.eligibility_text.as_deref().unwrap_or("")
    }

    /// Hybrid score, ignoring non-finite values
    pub fn score(&self) -> Option<f64> {
        self.hybrid_score.filter(|s| s.is_finite())
    }
}

/// User profile fields relevant to scoring and filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub age: u32,
    #[serde(alias = "annualIncome", default)]
    pub income: Option<f64>,
    #[serde(alias = "casteGroup", default)]
    pub caste_group: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(alias = "previousApplications", default)]
    pub previous_applications: Vec<String>,
}

impl UserProfile {
    /// Annual income, defaulting to 0 when unknown or negative
    pub fn annual_income(&self) -> f64 {
        self.income.filter(|i| i.is_finite() && *i > 0.0).unwrap_or(0.0)
    }

    /// Lower-cased caste group, empty when unset
    pub fn caste(&self) -> String {
        self.caste_group.as_deref().unwrap_or("").trim().to_lowercase()
    }

    /// Lower-cased gender, empty when unset
    pub fn gender_label(&self) -> String {
        self.gender.as_deref().unwrap_or("").trim().to_lowercase()
    }

    /// Age in years, `None` when unknown
    pub fn known_age(&self) -> Option<u32> {
        (self.age > 0).then_some(self.age)
    }

    /// All fields needed for a full recommendation run are present.
    /// Interests are optional.
    pub fn is_complete(&self) -> bool {
        fn set(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|s| !s.trim().is_empty())
        }

        self.age > 0
            && self.income.is_some()
            && set(&self.caste_group)
            && set(&self.occupation)
            && set(&self.gender)
            && set(&self.state)
    }
}

/// Candidate that survived the eligibility filter
///
/// The input candidate is never modified. A soft penalty is reported through
/// `adjusted_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(rename = "adjustedScore", default, skip_serializing_if = "Option::is_none")]
    pub adjusted_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub penalties: Vec<String>,
}

impl FilteredCandidate {
    pub fn unchanged(candidate: Candidate) -> Self {
        Self {
            candidate,
            adjusted_score: None,
            penalties: Vec::new(),
        }
    }

    /// Score used for ranking: adjusted, then hybrid, then 0
    pub fn effective_score(&self) -> f64 {
        self.adjusted_score
            .or_else(|| self.candidate.score())
            .unwrap_or(0.0)
    }

    /// Fold the adjusted score back into the hybrid score field
    pub fn into_candidate(self) -> Candidate {
        let mut candidate = self.candidate;
        if let Some(adjusted) = self.adjusted_score {
            candidate.hybrid_score = Some(adjusted);
        }
        candidate
    }
}

/// Named thresholds of the eligibility filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThresholds {
    /// Eligibility texts shorter than this (trimmed, in chars) are not evaluated
    pub min_text_len: usize,
    /// Subtracted from the score on a soft caste mismatch
    pub caste_penalty: f64,
    /// Max chars between an income keyword and its amount
    pub income_window: usize,
}

pub const DEFAULT_MIN_TEXT_LEN: usize = 5;
pub const DEFAULT_CASTE_PENALTY: f64 = 0.5;
pub const DEFAULT_INCOME_WINDOW: usize = 30;

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            caste_penalty: DEFAULT_CASTE_PENALTY,
            income_window: DEFAULT_INCOME_WINDOW,
        }
    }
}
