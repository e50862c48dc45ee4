use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{aggregation::AggregateError, gateway::GatewayError, store::StoreError};

pub const COORDINATES_USAGE: &str = "Incorrect coordinates. Try 23.341310,72.578284";
pub const COORDINATES_RANGE: &str = "Coordinates out of range: latitude must be within [-90, 90] and longitude within [-180, 180]. Try 23.341310,72.578284";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Enter geo coordinates")]
    MissingCoordinates,
    #[error("{}", COORDINATES_USAGE)]
    InvalidCoordinates,
    #[error("{}", COORDINATES_RANGE)]
    CoordinatesOutOfRange,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Storage(String),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(_) => ApiError::NotFound(err.to_string()),
            GatewayError::Decode(_) => ApiError::Decode(err.to_string()),
            GatewayError::Transport(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Errors go back as their message text. Everything is a client error
/// except a missing place or snapshot, which is a 404.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MissingCoordinates
            | ApiError::InvalidCoordinates
            | ApiError::CoordinatesOutOfRange => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Decode(_) | ApiError::Storage(_) => {
                error!("Request failed: {}", self);
                StatusCode::BAD_REQUEST
            }
        };

        (status, self.to_string()).into_response()
    }
}
