use crate::errors::ApiError;
use serde::Deserialize;
use std::{fmt, str::FromStr};
use validator::Validate;

/// Query string of `GET /covidData`.
#[derive(Debug, Default, Deserialize)]
pub struct CoordinatesQuery {
    #[serde(default)]
    pub coordinates: Option<String>,
}

impl CoordinatesQuery {
    pub fn parse(&self) -> Result<Coordinates, ApiError> {
        let raw = self
            .coordinates
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .ok_or(ApiError::MissingCoordinates)?;

        raw.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Parses `"lat,lon"`. Exactly two tokens, both finite floats; a pair that
/// parses but falls outside latitude/longitude range is reported separately.
impl FromStr for Coordinates {
    type Err = ApiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut tokens = raw.split(',');
        let (Some(latitude), Some(longitude), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ApiError::InvalidCoordinates);
        };

        let parse = |token: &str| {
            token
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or(ApiError::InvalidCoordinates)
        };

        let coordinates = Coordinates {
            latitude: parse(latitude)?,
            longitude: parse(longitude)?,
        };
        coordinates
            .validate()
            .map_err(|_| ApiError::CoordinatesOutOfRange)?;

        Ok(coordinates)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
