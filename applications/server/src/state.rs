/// Shared application state
use crate::services::TokenVerifier;
use cadence_catalog::SubsonicCatalog;
use cadence_sync::PlaylistService;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlaylistService>,
    /// Browse calls and the health ping go straight to the catalog
    pub catalog: Arc<SubsonicCatalog>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        service: Arc<PlaylistService>,
        catalog: Arc<SubsonicCatalog>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            service,
            catalog,
            verifier,
        }
    }
}
