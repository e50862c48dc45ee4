use serde::{Deserialize, Serialize};

/// Case counts for one region, or the sum over several.
///
/// Fields missing from the upstream record count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub confirmed: u64,
    pub deceased: u64,
    pub recovered: u64,
    pub tested: u64,
    pub vaccinated1: u64,
    pub vaccinated2: u64,
}

impl Totals {
    /// Element-wise sum, saturating at `u64::MAX`.
    pub fn add(&mut self, other: &Totals) {
        self.confirmed = self.confirmed.saturating_add(other.confirmed);
        self.deceased = self.deceased.saturating_add(other.deceased);
        self.recovered = self.recovered.saturating_add(other.recovered);
        self.tested = self.tested.saturating_add(other.tested);
        self.vaccinated1 = self.vaccinated1.saturating_add(other.vaccinated1);
        self.vaccinated2 = self.vaccinated2.saturating_add(other.vaccinated2);
    }
}

/// The part of a per-region snapshot entry we read. Everything besides
/// `total` (districts, deltas, meta) is ignored.
#[derive(Debug, Deserialize)]
pub struct RegionRecord {
    pub total: Totals,
}
