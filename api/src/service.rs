//! The refresh and lookup flows.

use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info, warn};

use crate::{
    aggregation::compute_totals,
    dto::{Coordinates, QueryResult},
    errors::ApiError,
    gateway::Place,
    models::SnapshotId,
    states::AppState,
};

/// Downloads the feed and makes it the current snapshot.
pub async fn refresh_snapshot(state: &AppState) -> Result<SnapshotId, ApiError> {
    let document = state.gateway.fetch_snapshot().await?;
    let regions = document.len();

    let id = state.store.replace(document).await?;
    info!("Stored snapshot {id} with {regions} entries");

    Ok(id)
}

/// Refreshes the snapshot every `every`, starting immediately. Failures are
/// logged and the next tick tries again.
pub fn spawn_periodic_refresh(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = refresh_snapshot(&state).await {
                error!("Scheduled refresh failed: {e}");
            }
        }
    })
}

/// Case totals for the region containing `coordinates`, served from the
/// cache when possible.
pub async fn lookup(state: &AppState, coordinates: &Coordinates) -> Result<QueryResult, ApiError> {
    let place = state.gateway.reverse_geocode(coordinates).await?;
    info!(
        "{coordinates} resolved to {} ({})",
        place.region, place.region_code
    );

    match state.cache.get(&place.region_code).await {
        Ok(Some(cached)) => return Ok(with_place(cached, place)),
        Ok(None) => {}
        Err(e) => warn!("Skipping cache read for {}: {e}", place.region_code),
    }

    let snapshot = state
        .store
        .read_current()
        .await?
        .ok_or_else(|| ApiError::NotFound("No covid data stored yet".into()))?;

    let aggregate = compute_totals(&snapshot, &place.region_code)?;
    if aggregate.skipped > 0 {
        info!(
            "Skipped {} snapshot entries without region totals",
            aggregate.skipped
        );
    }

    let result = QueryResult {
        state: place.region.clone(),
        district: place.name.clone(),
        state_covid_cases: aggregate.region,
        india_covid_cases: aggregate.national,
        last_updated_time: aggregate.last_updated,
    };

    if let Err(e) = state
        .cache
        .set(&place.region_code, &result, state.cache_ttl)
        .await
    {
        warn!("Skipping cache write for {}: {e}", place.region_code);
    }

    Ok(result)
}

/// Cached results are per region; names come from the current lookup.
fn with_place(mut result: QueryResult, place: Place) -> QueryResult {
    result.state = place.region;
    result.district = place.name;
    result
}
