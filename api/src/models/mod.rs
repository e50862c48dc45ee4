mod snapshot;
mod totals;

pub use snapshot::{SNAPSHOT_ID_KEY, Snapshot, SnapshotId};
pub use totals::{RegionRecord, Totals};
