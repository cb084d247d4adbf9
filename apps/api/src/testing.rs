//! Test doubles: in-memory collaborators, a scripted provider and an app-state builder.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tokio::sync::Mutex;

use crate::auth::{Claims, JwtCredentialResolver};
use crate::catalog::JobCatalog;
use crate::generation::runner::{provider_limiter, TaskRunner};
use crate::ledger::{LedgerError, UsageLedger};
use crate::llm_client::model_selector::listing_timeout_for;
use crate::llm_client::{ChatProvider, ChatRequest, LlmError, ModelSelector};
use crate::matching::orchestrator::{JobMatcher, MatchConfig};
use crate::models::job::JobPosting;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret";

// ────────────────────────────────────────────────────────────────────────────
// Scripted provider
// ────────────────────────────────────────────────────────────────────────────

pub enum Reply {
    Content(String),
    Fail,
    /// Never answers within any sane test timeout.
    Hang,
    Panic,
}

type Responder = Box<dyn Fn(&ChatRequest) -> Reply + Send + Sync>;

enum Listing {
    Models(Vec<String>),
    Fails,
    Hangs,
}

pub struct ScriptedProvider {
    listing: Listing,
    responder: Responder,
    latency: Duration,
    list_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: StdMutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn with_models(models: &[&str]) -> Self {
        Self::build(Listing::Models(
            models.iter().map(|m| m.to_string()).collect(),
        ))
    }

    pub fn listing_fails() -> Self {
        Self::build(Listing::Fails)
    }

    /// Model listing never answers; chat calls still work.
    pub fn listing_hangs() -> Self {
        Self::build(Listing::Hangs)
    }

    fn build(listing: Listing) -> Self {
        Self {
            listing,
            responder: Box::new(|_| {
                Reply::Content(r#"{"score": 50, "summary": "Average fit."}"#.to_string())
            }),
            latency: Duration::ZERO,
            list_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: StdMutex::new(Vec::new()),
        }
    }

    pub fn replying(mut self, responder: impl Fn(&ChatRequest) -> Reply + Send + Sync + 'static) -> Self {
        self.responder = Box::new(responder);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &self.listing {
            Listing::Models(models) => Ok(models.clone()),
            Listing::Fails => Err(LlmError::Api {
                status: 503,
                message: "model listing unavailable".to_string(),
            }),
            Listing::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::EmptyContent)
            }
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = match (self.responder)(request) {
            Reply::Content(text) => Ok(text),
            Reply::Fail => Err(LlmError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::EmptyContent)
            }
            Reply::Panic => panic!("scripted provider panic"),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// A runner whose limiter never gets in the way of a test.
pub fn runner_for(provider: &Arc<ScriptedProvider>) -> TaskRunner {
    runner_with_selector(
        provider,
        ModelSelector::new(provider.clone(), Duration::from_secs(300)),
    )
}

fn runner_with_selector(provider: &Arc<ScriptedProvider>, models: ModelSelector) -> TaskRunner {
    let rpm = NonZeroU32::new(600_000).unwrap();
    let burst = NonZeroU32::new(10_000).unwrap();
    TaskRunner::new(
        provider.clone(),
        Arc::new(models),
        Arc::new(provider_limiter(rpm, burst)),
    )
}

/// A matcher wired the way `main` wires it: the listing bound follows the task timeout.
pub fn matcher_for(provider: &Arc<ScriptedProvider>, config: MatchConfig) -> JobMatcher {
    let models = ModelSelector::new(provider.clone(), Duration::from_secs(300))
        .with_listing_timeout(listing_timeout_for(config.task_timeout));
    JobMatcher::new(Arc::new(runner_with_selector(provider, models)), config)
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory collaborators
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUsageLedger {
    balances: Mutex<HashMap<String, u32>>,
}

impl InMemoryUsageLedger {
    pub fn with_user(email: &str, credits: u32) -> Self {
        Self {
            balances: Mutex::new(HashMap::from([(email.to_string(), credits)])),
        }
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn check_and_deduct(&self, email: &str) -> Result<u32, LedgerError> {
        let mut balances = self.balances.lock().await;
        let credits = balances
            .get_mut(email)
            .ok_or_else(|| LedgerError::UnknownUser(email.to_string()))?;
        if *credits == 0 {
            return Err(LedgerError::InsufficientCredits);
        }
        *credits -= 1;
        Ok(*credits)
    }

    async fn balance(&self, email: &str) -> Result<u32, LedgerError> {
        self.balances
            .lock()
            .await
            .get(email)
            .copied()
            .ok_or_else(|| LedgerError::UnknownUser(email.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryJobCatalog {
    postings: Vec<JobPosting>,
}

impl InMemoryJobCatalog {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self { postings }
    }
}

#[async_trait]
impl JobCatalog for InMemoryJobCatalog {
    async fn recent(&self, limit: i64) -> Result<Vec<JobPosting>, sqlx::Error> {
        let mut postings = self.postings.clone();
        postings.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id)));
        postings.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(postings)
    }
}

/// A posting `minutes_ago` minutes before a fixed reference instant.
pub fn posting(id: i64, text: &str, minutes_ago: i64) -> JobPosting {
    let reference = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
    JobPosting {
        id,
        message_text: text.to_string(),
        posted_at: reference - chrono::Duration::minutes(minutes_ago),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// App state
// ────────────────────────────────────────────────────────────────────────────

pub fn app_state(
    ledger: Arc<InMemoryUsageLedger>,
    catalog: InMemoryJobCatalog,
    provider: &Arc<ScriptedProvider>,
) -> AppState {
    let runner = Arc::new(runner_for(provider));
    AppState {
        ledger,
        catalog: Arc::new(catalog),
        credentials: Arc::new(JwtCredentialResolver::new(
            TEST_JWT_SECRET,
            Algorithm::HS256,
        )),
        matcher: Arc::new(JobMatcher::new(runner.clone(), MatchConfig::default())),
        runner,
    }
}

pub fn bearer(email: &str) -> String {
    let claims = Claims {
        sub: email.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}
