//! HTTP access to the statistics feed and the reverse geocoder.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::{config::Config, dto::Coordinates};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed upstream response: {0}")]
    Decode(String),
    #[error("no region found for {0}")]
    NotFound(String),
}

/// A reverse-geocoded location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub region_code: String,
    /// State name.
    pub region: String,
    /// District or locality name.
    pub name: String,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Downloads the full statistics document.
    async fn fetch_snapshot(&self) -> Result<Map<String, Value>, GatewayError>;

    /// Resolves coordinates to the first matching region.
    async fn reverse_geocode(&self, coordinates: &Coordinates) -> Result<Place, GatewayError>;
}

pub struct HttpGateway {
    client: Client,
    feed_url: String,
    geocoder_url: String,
    access_key: String,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct GeocodeMatch {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_code: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            feed_url: config.feed_url.clone(),
            geocoder_url: config.geocoder_url.clone(),
            access_key: config.geocoder_access_key.clone(),
        })
    }

    async fn get_bytes(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, GatewayError> {
        let response = request.send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_snapshot(&self) -> Result<Map<String, Value>, GatewayError> {
        info!("Fetching statistics feed from {}", self.feed_url);

        let body = self.get_bytes(self.client.get(&self.feed_url)).await?;
        parse_document(&body)
    }

    async fn reverse_geocode(&self, coordinates: &Coordinates) -> Result<Place, GatewayError> {
        let query = coordinates.to_string();
        let request = self.client.get(&self.geocoder_url).query(&[
            ("access_key", self.access_key.as_str()),
            ("query", query.as_str()),
            ("limit", "1"),
        ]);

        let body = self.get_bytes(request).await?;
        let response: GeocodeResponse =
            serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        debug!("Geocoder returned {} matches for {query}", response.data.len());

        parse_place(response, &query)
    }
}

/// The feed must be a single JSON object keyed by region code.
fn parse_document(body: &[u8]) -> Result<Map<String, Value>, GatewayError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(GatewayError::Decode("feed is not a JSON object".into())),
        Err(e) => Err(GatewayError::Decode(e.to_string())),
    }
}

/// Takes the first match. The geocoder reports "nothing found" either as an
/// empty list or as a list holding an empty list.
fn parse_place(response: GeocodeResponse, query: &str) -> Result<Place, GatewayError> {
    let not_found = || GatewayError::NotFound(query.to_string());

    let Some(first @ Value::Object(_)) = response.data.into_iter().next() else {
        return Err(not_found());
    };
    let found =
        GeocodeMatch::deserialize(first).map_err(|e| GatewayError::Decode(e.to_string()))?;

    let region_code = found
        .region_code
        .filter(|code| !code.is_empty())
        .ok_or_else(not_found)?;

    Ok(Place {
        region_code,
        region: found.region.unwrap_or_default(),
        name: found.name.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> GeocodeResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn takes_first_match() {
        let place = parse_place(
            response(json!({"data": [
                {"name": "Ahmedabad", "region": "Gujarat", "country": "India", "region_code": "GJ"},
                {"name": "Other", "region": "Other", "region_code": "XX"}
            ]})),
            "23.34131,72.578284",
        )
        .unwrap();

        assert_eq!(
            place,
            Place {
                region_code: "GJ".into(),
                region: "Gujarat".into(),
                name: "Ahmedabad".into(),
            }
        );
    }

    #[test]
    fn empty_result_is_not_found() {
        for body in [json!({"data": []}), json!({"data": [[]]}), json!({})] {
            assert!(matches!(
                parse_place(response(body), "0,0"),
                Err(GatewayError::NotFound(_))
            ));
        }
    }

    #[test]
    fn match_without_region_code_is_not_found() {
        let body = json!({"data": [{"name": "Ocean", "region": null, "region_code": null}]});
        assert!(matches!(
            parse_place(response(body), "0,0"),
            Err(GatewayError::NotFound(_))
        ));
    }

    #[test]
    fn feed_object_is_accepted() {
        let document = parse_document(br#"{"KA": {"total": {"confirmed": 1}}}"#).unwrap();
        assert!(document.contains_key("KA"));
    }

    #[test]
    fn feed_must_be_an_object() {
        let bodies: [&[u8]; 6] = [b"[1, 2]", b"42", b"\"text\"", b"null", b"{not json", b""];
        for body in bodies {
            assert!(
                matches!(parse_document(body), Err(GatewayError::Decode(_))),
                "{:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }
}
