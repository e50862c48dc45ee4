use crate::models::Totals;
use serde::{Deserialize, Serialize};

/// Answer to a coordinates lookup. Also the cached value, keyed by region code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub state: String,
    pub district: String,
    /// `None` when the snapshot has no entry for the region.
    pub state_covid_cases: Option<Totals>,
    pub india_covid_cases: Totals,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub last_updated_time: Option<String>,
}
