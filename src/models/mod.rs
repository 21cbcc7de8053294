// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Candidate, FilteredCandidate, FilterThresholds, UserProfile};
pub use requests::{QuickRecommendRequest, RecommendRequest};
pub use responses::{ErrorResponse, HealthResponse, ModelInfo, ProfileSummary, RecommendResponse, StatusResponse};
