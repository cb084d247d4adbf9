//! Job catalog: read-only access to the scraped job postings.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::job::JobPosting;

#[async_trait]
pub trait JobCatalog: Send + Sync {
    /// The `limit` most recently posted jobs, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<JobPosting>, sqlx::Error>;
}

pub struct PgJobCatalog {
    pool: PgPool,
}

impl PgJobCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobCatalog for PgJobCatalog {
    async fn recent(&self, limit: i64) -> Result<Vec<JobPosting>, sqlx::Error> {
        sqlx::query_as::<_, JobPosting>(
            "SELECT id, message_text, posted_at FROM jobs ORDER BY posted_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
