//! Usage Ledger: gates and meters paid operations against a per-user credit balance.
//!
//! A charge is one conditional read-modify-write against the store, so two
//! concurrent requests can never both spend the last credit.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::user::User;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Spends one credit for `email`, returning the remaining balance.
    /// Fails with `InsufficientCredits` and no side effect when the balance is 0.
    async fn check_and_deduct(&self, email: &str) -> Result<u32, LedgerError>;

    /// Current balance, read-only.
    async fn balance(&self, email: &str) -> Result<u32, LedgerError>;
}

/// Postgres-backed ledger over the `users` table.
pub struct PgUsageLedger {
    pool: PgPool,
}

impl PgUsageLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, LedgerError> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, credits FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UsageLedger for PgUsageLedger {
    async fn check_and_deduct(&self, email: &str) -> Result<u32, LedgerError> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET credits = credits - 1
            WHERE email = $1 AND credits > 0
            RETURNING credits
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(remaining.max(0) as u32);
        }

        // Nothing updated: either the balance is exhausted or the user is gone.
        match self.find_user(email).await? {
            Some(user) => {
                info!("Refused charge for user {}: no credits left", user.id);
                Err(LedgerError::InsufficientCredits)
            }
            None => Err(LedgerError::UnknownUser(email.to_string())),
        }
    }

    async fn balance(&self, email: &str) -> Result<u32, LedgerError> {
        self.find_user(email)
            .await?
            .map(|user| user.credits.max(0) as u32)
            .ok_or_else(|| LedgerError::UnknownUser(email.to_string()))
    }
}
