//! Result aggregation: merges per-job outcomes and ranks them.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::generation::parser::JobMatchAnalysis;
use crate::models::job::JobPosting;

/// Summary carried by every degraded placeholder.
pub const DEGRADED_SUMMARY: &str = "Error during analysis";

/// One ranked posting. Field names follow the job-feed wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub id: i64,
    pub message_text: String,
    pub posted_at: DateTime<Utc>,
    #[serde(rename = "match_score")]
    pub score: u8,
    #[serde(rename = "match_summary")]
    pub summary: String,
    /// False for degraded placeholders.
    pub analyzed: bool,
}

impl MatchResult {
    pub fn from_analysis(posting: JobPosting, analysis: JobMatchAnalysis) -> Self {
        Self {
            id: posting.id,
            message_text: posting.message_text,
            posted_at: posting.posted_at,
            score: analysis.score.min(100) as u8,
            summary: analysis.summary,
            analyzed: true,
        }
    }

    pub fn degraded(posting: JobPosting) -> Self {
        Self {
            id: posting.id,
            message_text: posting.message_text,
            posted_at: posting.posted_at,
            score: 0,
            summary: DEGRADED_SUMMARY.to_string(),
            analyzed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    /// Non-increasing by score.
    pub results: Vec<MatchResult>,
    pub analyzed: usize,
    pub degraded: usize,
}

impl MatchReport {
    /// Share of postings that got a real analysis. 1.0 for an empty batch.
    pub fn success_ratio(&self) -> f64 {
        let total = self.analyzed + self.degraded;
        if total == 0 {
            return 1.0;
        }
        self.analyzed as f64 / total as f64
    }
}

/// Sorts by score, descending. The sort is stable: equal scores keep input order.
pub fn aggregate(mut outcomes: Vec<MatchResult>) -> MatchReport {
    outcomes.sort_by_key(|result| Reverse(result.score));

    let analyzed = outcomes.iter().filter(|result| result.analyzed).count();
    let degraded = outcomes.len() - analyzed;

    MatchReport {
        results: outcomes,
        analyzed,
        degraded,
    }
}
