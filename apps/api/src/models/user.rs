use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table. Created by signup, mutated only by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Never negative; the table carries a `CHECK (credits >= 0)`.
    pub credits: i32,
}
