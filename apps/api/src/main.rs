mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod generation;
mod ledger;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::JwtCredentialResolver;
use crate::catalog::PgJobCatalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::generation::runner::{provider_limiter, TaskRunner};
use crate::ledger::PgUsageLedger;
use crate::llm_client::model_selector::listing_timeout_for;
use crate::llm_client::{LlmClient, ModelSelector};
use crate::matching::orchestrator::{JobMatcher, MatchConfig};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    let llm = Arc::new(LlmClient::new(
        config.llm_base_url.clone(),
        config.groq_api_key.clone(),
    )?);
    info!("LLM client initialized ({})", config.llm_base_url);

    let task_timeout = Duration::from_secs(config.match_task_timeout_secs);
    let models = Arc::new(
        ModelSelector::new(llm.clone(), Duration::from_secs(config.model_cache_ttl_secs))
            .with_listing_timeout(listing_timeout_for(task_timeout)),
    );

    // Burst equals the fan-out width so a full wave of permits can start at once.
    let rpm = NonZeroU32::new(config.provider_requests_per_minute)
        .context("PROVIDER_REQUESTS_PER_MINUTE must be at least 1")?;
    let burst = u32::try_from(config.match_concurrency)
        .ok()
        .and_then(NonZeroU32::new)
        .context("MATCH_CONCURRENCY must be between 1 and u32::MAX")?;
    let limiter = Arc::new(provider_limiter(rpm, burst));
    info!(
        "Provider limiter: {rpm} requests/min, burst {burst}, {} in flight",
        config.match_concurrency
    );

    let runner = Arc::new(TaskRunner::new(llm, models, limiter));
    let matcher = Arc::new(JobMatcher::new(
        runner.clone(),
        MatchConfig {
            posting_limit: config.match_posting_limit,
            concurrency: config.match_concurrency,
            task_timeout,
        },
    ));

    let state = AppState {
        ledger: Arc::new(PgUsageLedger::new(db.clone())),
        catalog: Arc::new(PgJobCatalog::new(db)),
        credentials: Arc::new(JwtCredentialResolver::new(
            &config.jwt_secret,
            config.jwt_algorithm,
        )),
        runner,
        matcher,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
