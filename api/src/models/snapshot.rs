use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Reserved key carrying the store-assigned identifier inside a snapshot document.
pub const SNAPSHOT_ID_KEY: &str = "_id";

/// Store-assigned snapshot identifier: 8 hex digits of Unix seconds followed
/// by 16 random hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let seconds = now.timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{seconds:08x}{}", &random[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SnapshotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One full point-in-time capture of the statistics feed: region code to
/// region record, plus the reserved `_id` entry once stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    /// Stamps `document` with `id` under the reserved key.
    pub fn stored(id: &SnapshotId, mut document: Map<String, Value>) -> Self {
        document.insert(SNAPSHOT_ID_KEY.to_string(), Value::String(id.to_string()));
        Self(document)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(SNAPSHOT_ID_KEY).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(document: Map<String, Value>) -> Self {
        Self(document)
    }
}
