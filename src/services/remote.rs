use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::models::{Candidate, UserProfile};
use crate::services::scorer::{parse_candidates, ScorerError};

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    profile: &'a UserProfile,
    top_k: usize,
}

/// Scorer served over HTTP
///
/// POSTs `{"profile": ..., "top_k": k}` to the configured URL and expects the
/// same candidate array the inference script prints.
pub struct RemoteScorer {
    url: String,
    api_key: Option<String>,
    client: Client,
}

impl RemoteScorer {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ScorerError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { url, api_key, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_available(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub async fn recommend(
        &self,
        profile: &UserProfile,
        top_k: usize,
    ) -> Result<Vec<Candidate>, ScorerError> {
        if !self.is_available() {
            return Err(ScorerError::Unavailable("no scorer URL configured".to_string()));
        }

        tracing::debug!("Requesting {} recommendations from: {}", top_k, self.url);

        let mut request = self.client.post(&self.url).json(&ScoreRequest { profile, top_k });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ScorerError::ApiError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        parse_candidates(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_scorer_creation() {
        let scorer = RemoteScorer::new(
            "https://scorer.test/recommend".to_string(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(scorer.url(), "https://scorer.test/recommend");
        assert!(scorer.is_available());
    }

    #[tokio::test]
    async fn test_empty_url_is_unavailable() {
        let scorer = RemoteScorer::new(String::new(), None, Duration::from_secs(5)).unwrap();

        assert!(!scorer.is_available());
        assert!(matches!(
            scorer.recommend(&UserProfile::default(), 5).await,
            Err(ScorerError::Unavailable(_))
        ));
    }
}
