use std::sync::Arc;

use crate::auth::CredentialResolver;
use crate::catalog::JobCatalog;
use crate::generation::runner::TaskRunner;
use crate::ledger::UsageLedger;
use crate::matching::orchestrator::JobMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn UsageLedger>,
    pub catalog: Arc<dyn JobCatalog>,
    pub credentials: Arc<dyn CredentialResolver>,
    /// Single-shot tools. Shares its model selector and limiter with `matcher`.
    pub runner: Arc<TaskRunner>,
    pub matcher: Arc<JobMatcher>,
}
