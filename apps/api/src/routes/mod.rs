pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job feed
        .route("/api/jobs", get(matching::handle_list_jobs))
        .route("/api/credits", get(matching::handle_credits))
        .route("/api/match-jobs", post(matching::handle_match_jobs))
        // Single-shot tools
        .route("/api/cv-valuation", post(generation::handle_cv_valuation))
        .route(
            "/api/generate-interview-questions",
            post(generation::handle_interview_questions),
        )
        .route(
            "/api/analyze-interview-answer",
            post(generation::handle_interview_feedback),
        )
        .route("/api/generate", post(generation::handle_cover_letter))
        .route("/api/generate-bio", post(generation::handle_bio))
        .with_state(state)
}
