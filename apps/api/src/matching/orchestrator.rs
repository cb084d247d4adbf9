//! Fan-out matching: one analysis task per posting, gathered before ranking.
//!
//! Each task: concurrency permit → shared limiter → (within the per-task
//! timeout) model resolve, provider call, decode. Any failure degrades that
//! posting only; the batch always yields one result per posting.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::generation::parser::JobMatchAnalysis;
use crate::generation::runner::{TaskError, TaskRunner};
use crate::generation::tasks::Task;
use crate::matching::aggregator::{aggregate, MatchReport, MatchResult};
use crate::models::job::JobPosting;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// How many recent postings a request analyzes.
    pub posting_limit: i64,
    /// Max provider calls in flight, shared by all requests.
    pub concurrency: usize,
    pub task_timeout: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            posting_limit: 50,
            concurrency: 4,
            task_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
enum AnalysisFailure {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("concurrency limiter closed")]
    Closed,
}

pub struct JobMatcher {
    runner: Arc<TaskRunner>,
    permits: Arc<Semaphore>,
    config: MatchConfig,
}

impl JobMatcher {
    pub fn new(runner: Arc<TaskRunner>, config: MatchConfig) -> Self {
        Self {
            runner,
            permits: Arc::new(Semaphore::new(config.concurrency.max(1))),
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Analyzes every posting against `cv_text` and returns them ranked.
    ///
    /// Never fails: a posting whose analysis errors, times out or panics comes
    /// back as a degraded result with score 0.
    pub async fn match_jobs(&self, cv_text: &str, postings: Vec<JobPosting>) -> MatchReport {
        let cv_text: Arc<str> = Arc::from(cv_text);
        let mut handles = Vec::with_capacity(postings.len());

        for posting in postings {
            let runner = self.runner.clone();
            let permits = self.permits.clone();
            let cv_text = cv_text.clone();
            let job_text = posting.message_text.clone();
            let task_timeout = self.config.task_timeout;

            let handle = tokio::spawn(async move {
                analyze(&runner, &permits, &cv_text, &job_text, task_timeout).await
            });

            handles.push((posting, handle));
        }

        // Awaited in posting order so each outcome lines up with its posting.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (posting, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(analysis)) => MatchResult::from_analysis(posting, analysis),
                Ok(Err(e)) => {
                    warn!("Analysis of job {} failed: {e}", posting.id);
                    MatchResult::degraded(posting)
                }
                Err(e) => {
                    warn!("Analysis task for job {} aborted: {e}", posting.id);
                    MatchResult::degraded(posting)
                }
            };
            outcomes.push(outcome);
        }

        let report = aggregate(outcomes);
        info!(
            "Matched {} postings: {} analyzed, {} degraded ({:.0}% success)",
            report.results.len(),
            report.analyzed,
            report.degraded,
            report.success_ratio() * 100.0
        );
        if report.degraded > 0 && report.analyzed == 0 {
            warn!("Every posting in the batch degraded");
        }
        report
    }
}

async fn analyze(
    runner: &TaskRunner,
    permits: &Semaphore,
    cv_text: &str,
    job_text: &str,
    task_timeout: Duration,
) -> Result<JobMatchAnalysis, AnalysisFailure> {
    let _permit = permits.acquire().await.map_err(|_| AnalysisFailure::Closed)?;
    runner.pace().await;

    let task = Task::JobMatch { cv_text, job_text };
    match timeout(task_timeout, runner.complete_structured::<JobMatchAnalysis>(&task)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(AnalysisFailure::TimedOut(task_timeout)),
    }
}
