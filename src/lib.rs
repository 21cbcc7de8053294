//! Scheme Rank - eligibility filtering for government scheme recommendations
//!
//! This library wraps an external recommendation model with a rule-based
//! post-filter that drops or down-ranks schemes whose eligibility text rules
//! the user out (category reservations, income limits, gender, age).

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{EligibilityFilter, EligibilityRule, FilterError, FilterReport, Verdict};
pub use crate::models::{Candidate, FilteredCandidate, FilterThresholds, UserProfile, RecommendRequest, RecommendResponse};
