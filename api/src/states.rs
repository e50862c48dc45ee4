use crate::{cache::ResultCache, gateway::Gateway, store::SnapshotStore};
use std::{sync::Arc, time::Duration};

/// Collaborators shared by every handler, injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub store: Arc<dyn SnapshotStore>,
    pub cache: Arc<dyn ResultCache>,
    pub cache_ttl: Duration,
}
