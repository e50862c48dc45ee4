//! HTTP service answering "how many COVID-19 cases around these coordinates".
//!
//! - `GET /updateCovidCases` stores a fresh snapshot of the statistics feed
//! - `GET /covidData?coordinates=lat,lon` reverse-geocodes the point to a state
//!   and returns that state's totals next to the nationwide sum
//! - `GET /health`
//!
//! Results are cached per state. Snapshot and cache live in Redis when
//! `REDIS_URL` is set and in process memory otherwise.

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod database;
pub mod dto;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod service;
pub mod states;
pub mod store;

pub use states::AppState;

use cache::{MemoryCache, RedisCache, ResultCache};
use config::Config;
use gateway::{GatewayError, HttpGateway};
use store::{MemorySnapshotStore, RedisSnapshotStore, SnapshotStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Gateway(#[from] GatewayError),
    #[error("failed to connect to Redis: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Wires the collaborators described by `config`.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let timeout = Duration::from_secs(config.upstream_timeout_secs);
    let gateway = Arc::new(HttpGateway::new(config)?);

    let store: Arc<dyn SnapshotStore>;
    let cache: Arc<dyn ResultCache>;
    match &config.redis_url {
        Some(url) => {
            let connection = database::init_redis(url, timeout).await?;
            store = Arc::new(RedisSnapshotStore::new(connection.clone()));
            cache = Arc::new(RedisCache::new(connection));
        }
        None => {
            info!("REDIS_URL not set, keeping snapshot and cache in memory");
            store = Arc::new(MemorySnapshotStore::new());
            cache = Arc::new(MemoryCache::new());
        }
    }

    Ok(AppState {
        gateway,
        store,
        cache,
        cache_ttl: Duration::from_secs(config.cache_ttl_secs),
    })
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health_check))
        .route("/updateCovidCases", get(routes::update_covid_cases))
        .route("/covidData", get(routes::covid_data))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
