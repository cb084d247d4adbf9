//! Axum route handlers for the single-shot tools.
//!
//! Each tool validates its input, charges one credit, then makes exactly one
//! paced provider call. A failed call is not refunded.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::parser::{CvValuation, InterviewFeedback, InterviewQuestions};
use crate::generation::tasks::Task;
use crate::generation::tone::Tone;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CvJobRequest {
    pub cv_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewAnswerRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub job_description: String,
    pub user_info: String,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct BioRequest {
    pub user_info: String,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Debug, Serialize)]
pub struct BioResponse {
    pub bio: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/cv-valuation
pub async fn handle_cv_valuation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CvJobRequest>,
) -> Result<Json<CvValuation>, AppError> {
    require_text(&[
        ("cv_text", &request.cv_text),
        ("job_description", &request.job_description),
    ])?;
    charge(&state, &user, "cv_valuation").await?;

    let valuation = state
        .runner
        .run_structured(&Task::CvValuation {
            cv_text: &request.cv_text,
            job_description: &request.job_description,
        })
        .await?;

    Ok(Json(valuation))
}

/// POST /api/generate-interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CvJobRequest>,
) -> Result<Json<InterviewQuestions>, AppError> {
    require_text(&[
        ("cv_text", &request.cv_text),
        ("job_description", &request.job_description),
    ])?;
    charge(&state, &user, "interview_questions").await?;

    let questions = state
        .runner
        .run_structured(&Task::InterviewQuestions {
            cv_text: &request.cv_text,
            job_description: &request.job_description,
        })
        .await?;

    Ok(Json(questions))
}

/// POST /api/analyze-interview-answer
pub async fn handle_interview_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<InterviewAnswerRequest>,
) -> Result<Json<InterviewFeedback>, AppError> {
    require_text(&[("question", &request.question), ("answer", &request.answer)])?;
    charge(&state, &user, "interview_feedback").await?;

    let feedback = state
        .runner
        .run_structured(&Task::InterviewFeedback {
            question: &request.question,
            answer: &request.answer,
        })
        .await?;

    Ok(Json(feedback))
}

/// POST /api/generate
///
/// Cover letter for one job, written in the requested tone.
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    require_text(&[
        ("job_description", &request.job_description),
        ("user_info", &request.user_info),
    ])?;
    charge(&state, &user, "cover_letter").await?;

    let cover_letter = state
        .runner
        .run_text(&Task::CoverLetter {
            job_description: &request.job_description,
            user_info: &request.user_info,
            tone: request.tone,
        })
        .await?;

    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// POST /api/generate-bio
pub async fn handle_bio(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<BioRequest>,
) -> Result<Json<BioResponse>, AppError> {
    require_text(&[("user_info", &request.user_info)])?;
    charge(&state, &user, "bio").await?;

    let bio = state
        .runner
        .run_text(&Task::Bio {
            user_info: &request.user_info,
            tone: request.tone,
        })
        .await?;

    Ok(Json(BioResponse { bio }))
}

fn require_text(fields: &[(&str, &String)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::Validation(format!("{name} cannot be empty"))),
        None => Ok(()),
    }
}

async fn charge(state: &AppState, user: &AuthUser, tool: &str) -> Result<(), AppError> {
    let remaining = state.ledger.check_and_deduct(&user.email).await?;
    info!("Charged 1 credit for {tool} ({remaining} left)");
    Ok(())
}
