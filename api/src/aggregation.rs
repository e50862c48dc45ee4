//! Nationwide and per-region case totals from a stored snapshot.

use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{RegionRecord, SNAPSHOT_ID_KEY, Snapshot, Totals};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid snapshot identifier {0:?}")]
    InvalidIdentifier(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub national: Totals,
    /// `None` when the target region has no entry in the snapshot.
    pub region: Option<Totals>,
    pub last_updated: Option<String>,
    /// Entries that did not look like a region record.
    pub skipped: usize,
}

/// Sums every region record in `snapshot` and picks out `region_code`.
///
/// Entries that are not region records are skipped and counted. A malformed
/// `_id` is an error.
pub fn compute_totals(snapshot: &Snapshot, region_code: &str) -> Result<Aggregate, AggregateError> {
    let mut aggregate = Aggregate::default();

    for (key, value) in snapshot.entries() {
        if key == SNAPSHOT_ID_KEY {
            let id = value
                .as_str()
                .ok_or_else(|| AggregateError::InvalidIdentifier(value.to_string()))?;
            aggregate.last_updated = Some(decode_timestamp(id)?);
            continue;
        }

        let record = match RegionRecord::deserialize(value) {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping snapshot entry {key}: {e}");
                aggregate.skipped += 1;
                continue;
            }
        };

        aggregate.national.add(&record.total);
        if key == region_code {
            aggregate.region = Some(record.total);
        }
    }

    Ok(aggregate)
}

/// Formats the Unix seconds held in the leading 8 hex digits of `id`.
pub fn decode_timestamp(id: &str) -> Result<String, AggregateError> {
    let invalid = || AggregateError::InvalidIdentifier(id.to_string());

    let prefix = id.get(..8).ok_or_else(invalid)?;
    if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let seconds = i64::from_str_radix(prefix, 16).map_err(|_| invalid())?;
    let time = DateTime::from_timestamp(seconds, 0).ok_or_else(invalid)?;

    Ok(time.format(TIMESTAMP_FORMAT).to_string())
}
