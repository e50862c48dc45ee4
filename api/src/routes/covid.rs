use crate::{
    AppState,
    dto::{CoordinatesQuery, QueryResult},
    errors::ApiError,
    service,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::{debug, info};

pub const UPDATED_MESSAGE: &str = "Covid Data is Updated in Database";

/// GET /updateCovidCases
/// Replaces the stored snapshot with a fresh copy of the feed.
pub async fn update_covid_cases(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    let id = service::refresh_snapshot(&state).await?;
    info!("Snapshot refreshed on request: {id}");

    Ok(UPDATED_MESSAGE)
}

/// GET /covidData?coordinates=23.341310,72.578284
/// A query string that does not deserialize (e.g. a repeated parameter) gets
/// the usage message.
pub async fn covid_data(
    State(state): State<AppState>,
    params: Result<Query<CoordinatesQuery>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        debug!("Rejected coordinates query: {rejection}");
        ApiError::InvalidCoordinates
    })?;
    let coordinates = params.parse()?;
    let result = service::lookup(&state, &coordinates).await?;

    Ok(Json(result))
}
