use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{EligibilityFilter, FilterReport};
use crate::models::{
    Candidate, ErrorResponse, HealthResponse, ProfileSummary, QuickRecommendRequest,
    RecommendRequest, RecommendResponse, StatusResponse, UserProfile,
};
use crate::services::{CacheKey, ScoreCache, Scorer};

/// Candidates requested from the scorer per slot in the response, so that
/// filtered-out schemes can be backfilled
const OVERFETCH_FACTOR: usize = 2;
const MAX_FETCH: usize = 100;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<Scorer>,
    pub filter: Arc<EligibilityFilter>,
    pub cache: Option<Arc<ScoreCache>>,
}

/// Number of candidates to request from the scorer for `top_k` results
fn fetch_size(top_k: usize) -> usize {
    (top_k * OVERFETCH_FACTOR).min(MAX_FETCH).max(top_k)
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend))
        .route("/recommendations/quick", web::post().to(quick_recommend))
        .route("/recommendations/status", web::get().to(status));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.scorer.is_available().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommendation service status
///
/// GET /api/v1/recommendations/status
async fn status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        service_status: "operational".to_string(),
        model_info: state.scorer.model_info().await,
        cache: state.cache.as_ref().map(|c| c.stats()),
    })
}

/// Recommendations for a complete profile
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "profile": {"age": 30, "income": 250000, "caste_group": "OBC", ...},
///   "top_k": 10
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let RecommendRequest { profile, top_k } = req.into_inner();

    if !profile.is_complete() {
        let mut body = ErrorResponse::new(
            "Profile incomplete",
            "Please complete your profile to get recommendations.",
            400,
        );
        body.is_profile_complete = Some(false);
        return HttpResponse::BadRequest().json(body);
    }

    let top_k = top_k as usize;
    tracing::info!("Generating {} recommendations", top_k);

    match filtered_recommendations(&state, &profile, top_k).await {
        Ok(report) => {
            let filtered_out = report.rejections.len();
            HttpResponse::Ok().json(RecommendResponse {
                message: "Recommendations generated successfully".to_string(),
                request_id: uuid::Uuid::new_v4().to_string(),
                total_recommendations: report.candidates.len(),
                recommendations: report.candidates,
                user_profile: Some(ProfileSummary::from(&profile)),
                profile: None,
                filtered_out,
            })
        }
        Err(response) => response,
    }
}

/// Recommendations from a partial profile with defaults filled in
///
/// POST /api/v1/recommendations/quick
async fn quick_recommend(
    state: web::Data<AppState>,
    req: web::Json<QuickRecommendRequest>,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let profile = req.to_profile();
    let top_k = req.top_k as usize;

    match filtered_recommendations(&state, &profile, top_k).await {
        Ok(report) => {
            let filtered_out = report.rejections.len();
            HttpResponse::Ok().json(RecommendResponse {
                message: "Quick recommendations generated successfully".to_string(),
                request_id: uuid::Uuid::new_v4().to_string(),
                total_recommendations: report.candidates.len(),
                recommendations: report.candidates,
                user_profile: None,
                profile: Some(profile),
                filtered_out,
            })
        }
        Err(response) => response,
    }
}

/// Score, filter and trim to `top_k`
///
/// Returns a ready error response when the scorer is unavailable or fails.
async fn filtered_recommendations(
    state: &AppState,
    profile: &UserProfile,
    top_k: usize,
) -> Result<FilterReport, HttpResponse> {
    let model_info = state.scorer.model_info().await;
    if !model_info.is_available {
        tracing::warn!("Scorer unavailable at {}", model_info.location);
        let mut body = ErrorResponse::new(
            "Service unavailable",
            "Recommendation service is temporarily unavailable. Please try again later.",
            503,
        );
        body.model_info = Some(model_info);
        return Err(HttpResponse::ServiceUnavailable().json(body));
    }

    let fetch_k = fetch_size(top_k);
    let candidates = scored_candidates(state, profile, fetch_k).await.map_err(|e| {
        tracing::error!("Failed to generate recommendations: {}", e);
        HttpResponse::InternalServerError().json(ErrorResponse::new(
            "Failed to generate recommendations",
            e.to_string(),
            500,
        ))
    })?;

    let total = candidates.len();
    let mut report = state.filter.apply_with_report(candidates, profile);
    report.candidates.truncate(top_k);

    tracing::info!(
        "Returning {} recommendations ({} scored, {} filtered out)",
        report.candidates.len(),
        total,
        report.rejections.len()
    );

    Ok(report)
}

/// Scorer output, served from the cache when possible
async fn scored_candidates(
    state: &AppState,
    profile: &UserProfile,
    fetch_k: usize,
) -> Result<Vec<Candidate>, crate::services::ScorerError> {
    let Some(cache) = &state.cache else {
        return state.scorer.recommend(profile, fetch_k).await;
    };

    let key = match CacheKey::recommendations(profile, fetch_k) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Failed to build cache key, bypassing cache: {}", e);
            return state.scorer.recommend(profile, fetch_k).await;
        }
    };

    if let Ok(candidates) = cache.get::<Vec<Candidate>>(&key).await {
        tracing::debug!("Serving {} cached candidates", candidates.len());
        return Ok(candidates);
    }

    let candidates = state.scorer.recommend(profile, fetch_k).await?;
    if let Err(e) = cache.set(&key, &candidates).await {
        tracing::warn!("Failed to cache scorer output: {}", e);
    }

    Ok(candidates)
}
