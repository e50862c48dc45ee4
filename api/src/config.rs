use std::{env, fmt::Display, ops::RangeInclusive, str::FromStr};

use thiserror::Error;
use tracing::info;

pub const DEFAULT_FEED_URL: &str = "https://data.covid19india.org/v4/min/data.min.json";
pub const DEFAULT_GEOCODER_URL: &str = "http://api.positionstack.com/v1/reverse";

const WEEK_SECS: u64 = 7 * 24 * 60 * 60;
const UPSTREAM_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;
const CACHE_TTL_RANGE: RangeInclusive<u64> = 1..=WEEK_SECS;
const REFRESH_INTERVAL_RANGE: RangeInclusive<u64> = 0..=WEEK_SECS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Unset means in-process store and cache.
    pub redis_url: Option<String>,
    pub feed_url: String,
    pub geocoder_url: String,
    pub geocoder_access_key: String,
    pub upstream_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// 0 disables the background refresh.
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "PORT", "3000")?,
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            feed_url: try_load(&lookup, "COVID_FEED_URL", DEFAULT_FEED_URL)?,
            geocoder_url: try_load(&lookup, "GEOCODER_URL", DEFAULT_GEOCODER_URL)?,
            geocoder_access_key: lookup("GEOCODER_ACCESS_KEY")
                .filter(|key| !key.is_empty())
                .ok_or(ConfigError::Missing("GEOCODER_ACCESS_KEY"))?,
            upstream_timeout_secs: try_load_secs(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                "5",
                UPSTREAM_TIMEOUT_RANGE,
            )?,
            cache_ttl_secs: try_load_secs(&lookup, "CACHE_TTL_SECS", "1800", CACHE_TTL_RANGE)?,
            refresh_interval_secs: try_load_secs(
                &lookup,
                "REFRESH_INTERVAL_SECS",
                "0",
                REFRESH_INTERVAL_RANGE,
            )?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

fn try_load_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
    range: RangeInclusive<u64>,
) -> Result<u64, ConfigError> {
    let secs: u64 = try_load(lookup, key, default)?;
    if !range.contains(&secs) {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: format!("must be within {}..={}", range.start(), range.end()),
        });
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("GEOCODER_ACCESS_KEY", "secret")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.cache_ttl_secs, 1800);
        assert_eq!(config.refresh_interval_secs, 0);
    }

    #[test]
    fn access_key_is_required() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("GEOCODER_ACCESS_KEY"))
        ));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = load(&[("GEOCODER_ACCESS_KEY", "secret"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn rejects_out_of_range_durations() {
        for (key, value) in [
            ("CACHE_TTL_SECS", "18446744073709551615"),
            ("CACHE_TTL_SECS", "0"),
            ("UPSTREAM_TIMEOUT_SECS", "0"),
            ("REFRESH_INTERVAL_SECS", "99999999999"),
        ] {
            let err = load(&[("GEOCODER_ACCESS_KEY", "secret"), (key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_bounds() {
        let config = load(&[
            ("GEOCODER_ACCESS_KEY", "secret"),
            ("CACHE_TTL_SECS", "604800"),
            ("UPSTREAM_TIMEOUT_SECS", "1"),
        ])
        .unwrap();
        assert_eq!(config.cache_ttl_secs, WEEK_SECS);
        assert_eq!(config.upstream_timeout_secs, 1);
    }
}
