//! Model Selector: picks the most capable model the provider can serve right now.
//!
//! Availability of *some* model matters more than using the best one, so
//! `resolve()` never fails: listing errors and empty intersections fall back
//! to `FALLBACK_MODEL`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::llm_client::ChatProvider;

/// Preferred models, most to least capable.
pub const MODEL_PREFERENCE: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-70b-versatile",
    "llama3-70b-8192",
    "llama-3.1-8b-instant",
];

/// Last-resort model used when nothing preferred can be confirmed.
pub const FALLBACK_MODEL: &str = "llama3-8b-8192";

/// Longest a single model listing may take before it counts as failed.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(5);

/// Listing bound for callers that run under `task_timeout`: a stalled listing
/// must leave most of the task's budget for the chat call itself.
pub fn listing_timeout_for(task_timeout: Duration) -> Duration {
    LISTING_TIMEOUT.min(task_timeout / 4)
}

struct CachedModel {
    id: String,
    resolved_at: Instant,
}

#[derive(Default)]
struct Selection {
    cached: Option<CachedModel>,
    last_failure: Option<Instant>,
}

pub struct ModelSelector {
    provider: Arc<dyn ChatProvider>,
    ttl: Duration,
    listing_timeout: Duration,
    // Held across the listing call so a cold cache triggers one listing, not one per caller.
    selection: Mutex<Selection>,
}

impl ModelSelector {
    pub fn new(provider: Arc<dyn ChatProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            listing_timeout: LISTING_TIMEOUT,
            selection: Mutex::new(Selection::default()),
        }
    }

    pub fn with_listing_timeout(mut self, listing_timeout: Duration) -> Self {
        self.listing_timeout = listing_timeout;
        self
    }

    /// Returns the model identifier to address.
    pub async fn resolve(&self) -> String {
        let requested_at = Instant::now();
        let mut selection = self.selection.lock().await;

        if let Some(entry) = selection.cached.as_ref() {
            if entry.resolved_at.elapsed() < self.ttl {
                return entry.id.clone();
            }
        }

        // A listing that failed while this caller was queued answers for it too.
        if selection
            .last_failure
            .is_some_and(|failed_at| failed_at >= requested_at)
        {
            return FALLBACK_MODEL.to_string();
        }

        let failure = match timeout(self.listing_timeout, self.provider.list_models()).await {
            Ok(Ok(available)) => {
                let id = pick_preferred(&available);
                info!("Resolved model {id} from {} available", available.len());
                *selection = Selection {
                    cached: Some(CachedModel {
                        id: id.clone(),
                        resolved_at: Instant::now(),
                    }),
                    last_failure: None,
                };
                return id;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("no answer within {:?}", self.listing_timeout),
        };

        // Not cached: the next caller retries the listing.
        warn!("Model listing failed, using fallback {FALLBACK_MODEL}: {failure}");
        *selection = Selection {
            cached: None,
            last_failure: Some(Instant::now()),
        };
        FALLBACK_MODEL.to_string()
    }

    /// Drops the cached model. Called after a chat call against it fails.
    pub async fn invalidate(&self) {
        if self.selection.lock().await.cached.take().is_some() {
            debug!("Model cache invalidated");
        }
    }
}

fn pick_preferred(available: &[String]) -> String {
    MODEL_PREFERENCE
        .iter()
        .find(|preferred| available.iter().any(|a| a == *preferred))
        .copied()
        .unwrap_or(FALLBACK_MODEL)
        .to_string()
}
