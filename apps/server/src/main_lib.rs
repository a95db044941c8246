use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use xref_core::constants::LOOKUP_SCOPE;
use xref_core::downstream::{DownstreamClient, SnapshotProvider};
use xref_core::index::SymbolIndex;
use xref_core::lookup::LookupService;
use xref_core::reconcile::ReconciliationService;
use xref_core::store::KeyValueStore;
use xref_core::xref::{CrossReferenceService, CrossReferenceServiceTrait};
use xref_source::{CircuitBreaker, HttpSourceConfig, RateLimiter, SOURCE_ID};
use xref_storage_redis::{RedisStore, RedisStoreConfig};

pub struct AppState {
    pub xref_service: Arc<dyn CrossReferenceServiceTrait>,
    pub reconciler: Arc<ReconciliationService>,
}

/// Rate limiter and circuit breaker shared by the lookup and downstream scopes.
pub struct Resilience {
    pub rate_limiter: Arc<RateLimiter>,
    pub circuit_breaker: Arc<CircuitBreaker>,
}

impl Resilience {
    pub fn from_config(config: &Config) -> Self {
        let rate_limiter = RateLimiter::new()
            .with_scope(Cow::Borrowed(LOOKUP_SCOPE), config.lookup_rate.clone())
            .with_scope(Cow::Borrowed(SOURCE_ID), config.downstream_rate.clone());
        Self {
            rate_limiter: Arc::new(rate_limiter),
            circuit_breaker: Arc::new(CircuitBreaker::with_config(config.circuit.clone())),
        }
    }
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = RedisStore::connect(RedisStoreConfig {
        url: config.redis_url.clone(),
        command_timeout: config.request_timeout,
    })
    .await
    .context("Failed to connect to Redis")?;
    tracing::info!("Key-value store ready");

    let resilience = Resilience::from_config(config);
    let downstream = DownstreamClient::http(
        HttpSourceConfig {
            endpoint: config.downstream_endpoint.clone(),
            timeout: config.downstream_timeout,
        },
        resilience.rate_limiter.clone(),
        resilience.circuit_breaker.clone(),
    )
    .context("Failed to configure downstream client")?;
    tracing::info!("Downstream endpoint: {}", config.downstream_endpoint);

    Ok(build_state_with(
        Arc::new(store),
        Arc::new(downstream),
        resilience,
    ))
}

/// Wire the services over an already-constructed store and snapshot provider.
pub fn build_state_with(
    store: Arc<dyn KeyValueStore>,
    downstream: Arc<dyn SnapshotProvider>,
    resilience: Resilience,
) -> Arc<AppState> {
    let index = Arc::new(SymbolIndex::new(store));
    let lookup = LookupService::new(
        index.clone(),
        resilience.rate_limiter.clone(),
        resilience.circuit_breaker.clone(),
    );
    let reconciler = Arc::new(ReconciliationService::new(index.clone(), downstream));
    let xref_service = Arc::new(CrossReferenceService::new(
        index,
        lookup,
        reconciler.clone(),
        resilience.circuit_breaker,
    ));

    Arc::new(AppState {
        xref_service,
        reconciler,
    })
}
