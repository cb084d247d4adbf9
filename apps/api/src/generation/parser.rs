//! Response Parser: strict decoding of the provider's JSON output.
//!
//! Every analytical task has a typed schema. Decoding checks presence and type
//! of each required key (serde), then `validate()` checks ranges. Anything off
//! is a `MalformedResponse`, never a panic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::strip_json_fences;

const MAX_SCORE: u32 = 100;
const MAX_INTERVIEW_QUESTIONS: usize = 10;

#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("response is not the expected JSON object: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response failed validation: {0}")]
    Invalid(String),
}

/// A typed task output with range checks beyond what serde enforces.
pub trait StructuredOutput: DeserializeOwned {
    fn validate(&self) -> Result<(), String>;
}

/// Decodes and validates raw provider text as `T`.
pub fn parse<T: StructuredOutput>(raw: &str) -> Result<T, MalformedResponse> {
    let value: T = serde_json::from_str(strip_json_fences(raw))?;
    value.validate().map_err(MalformedResponse::Invalid)?;
    Ok(value)
}

/// Job-match analysis for one posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchAnalysis {
    pub score: u32,
    pub summary: String,
}

impl StructuredOutput for JobMatchAnalysis {
    fn validate(&self) -> Result<(), String> {
        check_score("score", self.score)?;
        check_text("summary", &self.summary)
    }
}

/// CV valuation report. Keys are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvValuation {
    pub match_score: u32,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

impl StructuredOutput for CvValuation {
    fn validate(&self) -> Result<(), String> {
        check_score("matchScore", self.match_score)?;
        if self.suggestions.is_empty() {
            return Err("suggestions must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestions {
    pub questions: Vec<String>,
}

impl StructuredOutput for InterviewQuestions {
    fn validate(&self) -> Result<(), String> {
        if self.questions.is_empty() || self.questions.len() > MAX_INTERVIEW_QUESTIONS {
            return Err(format!(
                "expected 1 to {MAX_INTERVIEW_QUESTIONS} questions, got {}",
                self.questions.len()
            ));
        }
        self.questions
            .iter()
            .try_for_each(|question| check_text("questions[]", question))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub positive_feedback: String,
    pub constructive_feedback: String,
    pub example_improvement: String,
}

impl StructuredOutput for InterviewFeedback {
    fn validate(&self) -> Result<(), String> {
        check_text("positive_feedback", &self.positive_feedback)?;
        check_text("constructive_feedback", &self.constructive_feedback)?;
        check_text("example_improvement", &self.example_improvement)
    }
}

fn check_score(key: &str, score: u32) -> Result<(), String> {
    if score > MAX_SCORE {
        return Err(format!("{key} {score} is outside 0..={MAX_SCORE}"));
    }
    Ok(())
}

fn check_text(key: &str, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err(format!("{key} must not be empty"));
    }
    Ok(())
}
