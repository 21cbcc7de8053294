use serde::Deserialize;
use thiserror::Error;

use crate::models::{Candidate, ModelInfo, UserProfile};
use crate::services::process::ProcessScorer;
use crate::services::remote::RemoteScorer;

/// Errors that can occur when asking the scorer for recommendations
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("Failed to start scorer process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Scorer process exited with code {code:?}: {stderr}")]
    ProcessFailed { code: Option<i32>, stderr: String },

    #[error("Scorer timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Scorer returned error status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Failed to parse scorer output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("Scorer unavailable: {0}")]
    Unavailable(String),
}

/// Scorer output: either a bare array or wrapped in `recommendations`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScorerPayload {
    List(Vec<Candidate>),
    Wrapped { recommendations: Vec<Candidate> },
}

/// Parse the candidate list the scorer printed or returned
pub fn parse_candidates(bytes: &[u8]) -> Result<Vec<Candidate>, ScorerError> {
    let payload: ScorerPayload = serde_json::from_slice(bytes)?;
    Ok(match payload {
        ScorerPayload::List(candidates) => candidates,
        ScorerPayload::Wrapped { recommendations } => recommendations,
    })
}

/// The external recommendation model, reached through one of its backends
pub enum Scorer {
    Process(ProcessScorer),
    Remote(RemoteScorer),
}

impl Scorer {
    /// Ranked candidates for `profile`, at most `top_k` of them
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        top_k: usize,
    ) -> Result<Vec<Candidate>, ScorerError> {
        match self {
            Scorer::Process(scorer) => scorer.recommend(profile, top_k).await,
            Scorer::Remote(scorer) => scorer.recommend(profile, top_k).await,
        }
    }

    pub async fn is_available(&self) -> bool {
        match self {
            Scorer::Process(scorer) => scorer.is_available().await,
            Scorer::Remote(scorer) => scorer.is_available(),
        }
    }

    pub async fn model_info(&self) -> ModelInfo {
        let (backend, location) = match self {
            Scorer::Process(scorer) => ("process", scorer.model_path().display().to_string()),
            Scorer::Remote(scorer) => ("http", scorer.url().to_string()),
        };

        ModelInfo {
            is_available: self.is_available().await,
            backend: backend.to_string(),
            location,
        }
    }
}
