//! Axum route handlers for the matching API.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::matching::aggregator::MatchResult;
use crate::models::job::JobPosting;
use crate::state::AppState;

pub const ANALYZED_HEADER: &str = "x-match-analyzed";
pub const DEGRADED_HEADER: &str = "x-match-degraded";

#[derive(Debug, Deserialize)]
pub struct MatchJobsRequest {
    pub cv_text: String,
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub credits: u32,
}

/// POST /api/match-jobs
///
/// Reads the most recent postings, charges one credit, then scores them against the CV.
/// Postings whose analysis failed are still returned, ranked last with score 0.
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<MatchJobsRequest>,
) -> Result<(HeaderMap, Json<Vec<MatchResult>>), AppError> {
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text cannot be empty".to_string()));
    }

    // The catalog read is free, so a storage failure here costs no credit.
    let postings = state
        .catalog
        .recent(state.matcher.config().posting_limit)
        .await?;

    let remaining = state.ledger.check_and_deduct(&user.email).await?;
    info!("Charged 1 credit for job matching ({remaining} left)");

    let report = state.matcher.match_jobs(&request.cv_text, postings).await;

    let mut headers = HeaderMap::new();
    headers.insert(ANALYZED_HEADER, HeaderValue::from(report.analyzed));
    headers.insert(DEGRADED_HEADER, HeaderValue::from(report.degraded));

    Ok((headers, Json(report.results)))
}

/// GET /api/jobs
///
/// The postings a match request would analyze, newest first. Free.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let postings = state
        .catalog
        .recent(state.matcher.config().posting_limit)
        .await?;
    Ok(Json(postings))
}

/// GET /api/credits
pub async fn handle_credits(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CreditsResponse>, AppError> {
    let credits = state.ledger.balance(&user.email).await?;
    Ok(Json(CreditsResponse { credits }))
}
