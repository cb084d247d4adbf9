//! Prompt Builder: one variant per provider-backed task.
//!
//! Caller text is embedded verbatim. Analytical tasks ask for JSON-object
//! output with low temperature; generative tasks are free text, steered by a
//! caller-chosen `Tone`.

use crate::generation::prompts::{
    BIO_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE, CV_VALUATION_PROMPT_TEMPLATE,
    INTERVIEW_FEEDBACK_PROMPT_TEMPLATE, INTERVIEW_QUESTIONS_PROMPT_TEMPLATE,
    JOB_MATCH_PROMPT_TEMPLATE, WRITER_SYSTEM,
};
use crate::generation::tone::{render_tone_instruction, Tone};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{ChatMessage, ChatRequest, OutputMode};

#[derive(Debug, Clone, Copy)]
pub enum Task<'a> {
    JobMatch {
        cv_text: &'a str,
        job_text: &'a str,
    },
    CvValuation {
        cv_text: &'a str,
        job_description: &'a str,
    },
    InterviewQuestions {
        cv_text: &'a str,
        job_description: &'a str,
    },
    InterviewFeedback {
        question: &'a str,
        answer: &'a str,
    },
    CoverLetter {
        job_description: &'a str,
        user_info: &'a str,
        tone: Tone,
    },
    Bio {
        user_info: &'a str,
        tone: Tone,
    },
}

/// A built prompt plus the decoding parameters that go with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
    pub output: OutputMode,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Prompt {
    /// Addresses the prompt to a concrete model.
    pub fn into_request(self, model: String) -> ChatRequest {
        ChatRequest {
            model,
            messages: vec![ChatMessage::system(self.system), ChatMessage::user(self.user)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            output: self.output,
        }
    }
}

impl Task<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Task::JobMatch { .. } => "job_match",
            Task::CvValuation { .. } => "cv_valuation",
            Task::InterviewQuestions { .. } => "interview_questions",
            Task::InterviewFeedback { .. } => "interview_feedback",
            Task::CoverLetter { .. } => "cover_letter",
            Task::Bio { .. } => "bio",
        }
    }

    pub fn prompt(&self) -> Prompt {
        match *self {
            Task::JobMatch { cv_text, job_text } => analytical(
                fill_template(
                    JOB_MATCH_PROMPT_TEMPLATE,
                    &[("cv_text", cv_text), ("job_text", job_text)],
                ),
                0.1,
                256,
            ),
            Task::CvValuation {
                cv_text,
                job_description,
            } => analytical(
                fill_template(
                    CV_VALUATION_PROMPT_TEMPLATE,
                    &[("cv_text", cv_text), ("job_description", job_description)],
                ),
                0.2,
                1024,
            ),
            Task::InterviewQuestions {
                cv_text,
                job_description,
            } => analytical(
                fill_template(
                    INTERVIEW_QUESTIONS_PROMPT_TEMPLATE,
                    &[("cv_text", cv_text), ("job_description", job_description)],
                ),
                0.4,
                1024,
            ),
            Task::InterviewFeedback { question, answer } => analytical(
                fill_template(
                    INTERVIEW_FEEDBACK_PROMPT_TEMPLATE,
                    &[("question", question), ("answer", answer)],
                ),
                0.3,
                768,
            ),
            Task::CoverLetter {
                job_description,
                user_info,
                tone,
            } => {
                let tone_instruction = render_tone_instruction(tone);
                generative(
                    fill_template(
                        COVER_LETTER_PROMPT_TEMPLATE,
                        &[
                            ("tone_instruction", tone_instruction.as_str()),
                            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
                            ("job_description", job_description),
                            ("user_info", user_info),
                        ],
                    ),
                    1024,
                )
            }
            Task::Bio { user_info, tone } => {
                let tone_instruction = render_tone_instruction(tone);
                generative(
                    fill_template(
                        BIO_PROMPT_TEMPLATE,
                        &[
                            ("tone_instruction", tone_instruction.as_str()),
                            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
                            ("user_info", user_info),
                        ],
                    ),
                    512,
                )
            }
        }
    }
}

fn analytical(user: String, temperature: f32, max_tokens: u32) -> Prompt {
    Prompt {
        system: JSON_ONLY_SYSTEM,
        user,
        output: OutputMode::JsonObject,
        temperature,
        max_tokens,
    }
}

fn generative(user: String, max_tokens: u32) -> Prompt {
    Prompt {
        system: WRITER_SYSTEM,
        user,
        output: OutputMode::Text,
        temperature: 0.7,
        max_tokens,
    }
}

/// Replaces `{name}` placeholders in one left-to-right pass.
///
/// Substituted values are never rescanned, so braces inside caller text stay
/// verbatim. Unknown placeholders (like the JSON examples) are left alone.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replacement = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match replacement {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
