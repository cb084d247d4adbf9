//! Task Runner: resolves a model, sends a built prompt and decodes the reply.
//!
//! Shared by the single-shot tools and the job matcher. Pacing is split out
//! (`pace`) so the matcher can wait on the limiter outside its per-task timeout.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use thiserror::Error;
use tracing::debug;

use crate::generation::parser::{parse, MalformedResponse, StructuredOutput};
use crate::generation::tasks::Task;
use crate::llm_client::{ChatProvider, LlmError, ModelSelector};

/// Process-wide token bucket in front of every chat call.
pub type ProviderLimiter = DefaultDirectRateLimiter;

pub fn provider_limiter(requests_per_minute: NonZeroU32, burst: NonZeroU32) -> ProviderLimiter {
    RateLimiter::direct(Quota::per_minute(requests_per_minute).allow_burst(burst))
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Malformed provider response: {0}")]
    Malformed(#[from] MalformedResponse),
}

pub struct TaskRunner {
    provider: Arc<dyn ChatProvider>,
    models: Arc<ModelSelector>,
    limiter: Arc<ProviderLimiter>,
}

impl TaskRunner {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        models: Arc<ModelSelector>,
        limiter: Arc<ProviderLimiter>,
    ) -> Self {
        Self {
            provider,
            models,
            limiter,
        }
    }

    /// Waits until the shared limiter admits one more provider call.
    pub async fn pace(&self) {
        self.limiter.until_ready().await;
    }

    /// One unpaced provider call. A failed call drops the cached model.
    pub async fn complete(&self, task: &Task<'_>) -> Result<String, TaskError> {
        let model = self.models.resolve().await;
        let request = task.prompt().into_request(model);
        debug!(
            "Running {} on {} ({} prompt chars)",
            task.name(),
            request.model,
            request.user_content().len()
        );

        match self.provider.chat(&request).await {
            Ok(text) => Ok(text),
            Err(e) => {
                self.models.invalidate().await;
                Err(TaskError::Provider(e))
            }
        }
    }

    /// Unpaced call decoded into the task's schema.
    pub async fn complete_structured<T: StructuredOutput>(
        &self,
        task: &Task<'_>,
    ) -> Result<T, TaskError> {
        let raw = self.complete(task).await?;
        Ok(parse(&raw)?)
    }

    /// Paced free-text call for generative tools.
    pub async fn run_text(&self, task: &Task<'_>) -> Result<String, TaskError> {
        self.pace().await;
        let text = self.complete(task).await?;
        Ok(text.trim().to_string())
    }

    /// Paced structured call for analytical tools.
    pub async fn run_structured<T: StructuredOutput>(&self, task: &Task<'_>) -> Result<T, TaskError> {
        self.pace().await;
        self.complete_structured(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::parser::InterviewFeedback;
    use crate::generation::tone::Tone;
    use crate::llm_client::OutputMode;
    use crate::testing::{runner_for, Reply, ScriptedProvider};

    #[tokio::test]
    async fn test_run_structured_decodes_reply() {
        let provider = Arc::new(ScriptedProvider::with_models(&["llama-3.3-70b-versatile"]).replying(
            |_| {
                Reply::Content(
                    r#"{"positive_feedback": "Clear.", "constructive_feedback": "Add a metric.", "example_improvement": "I cut costs by 20%."}"#
                        .to_string(),
                )
            },
        ));
        let runner = runner_for(&provider);

        let feedback: InterviewFeedback = runner
            .run_structured(&Task::InterviewFeedback {
                question: "Tell me about a win.",
                answer: "I saved money.",
            })
            .await
            .unwrap();

        assert_eq!(feedback.constructive_feedback, "Add a metric.");
        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "llama-3.3-70b-versatile");
        assert_eq!(request.output, OutputMode::JsonObject);
    }

    #[tokio::test]
    async fn test_run_text_trims_and_uses_text_mode() {
        let provider = Arc::new(
            ScriptedProvider::with_models(&["llama3-70b-8192"])
                .replying(|_| Reply::Content("\n  I am a data analyst.  \n".to_string())),
        );
        let runner = runner_for(&provider);

        let bio = runner
            .run_text(&Task::Bio {
                user_info: "analyst",
                tone: Tone::Casual,
            })
            .await
            .unwrap();

        assert_eq!(bio, "I am a data analyst.");
        assert_eq!(provider.last_request().unwrap().output, OutputMode::Text);
    }

    #[tokio::test]
    async fn test_provider_failure_invalidates_model_cache() {
        let provider = Arc::new(
            ScriptedProvider::with_models(&["llama3-70b-8192"]).replying(|_| Reply::Fail),
        );
        let runner = runner_for(&provider);
        let task = Task::Bio {
            user_info: "x",
            tone: Tone::Professional,
        };

        assert!(matches!(runner.run_text(&task).await, Err(TaskError::Provider(_))));
        assert!(runner.run_text(&task).await.is_err());

        assert_eq!(provider.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_reply_keeps_model_cache() {
        let provider = Arc::new(
            ScriptedProvider::with_models(&["llama3-70b-8192"])
                .replying(|_| Reply::Content("not json".to_string())),
        );
        let runner = runner_for(&provider);
        let task = Task::InterviewFeedback {
            question: "q",
            answer: "a",
        };

        for _ in 0..2 {
            let result = runner.run_structured::<InterviewFeedback>(&task).await;
            assert!(matches!(result, Err(TaskError::Malformed(_))));
        }

        assert_eq!(provider.list_calls(), 1);
    }
}
