//! Shared application state injected into all Axum handlers.

use std::fmt;
use std::sync::Arc;

use crate::persistence::RegistrationStore;
use crate::service::{QueryService, RegistrationService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Register / cancel decisions.
    pub registrations: Arc<RegistrationService>,
    /// Event creation and reads.
    pub queries: Arc<QueryService>,
    /// Expected `x-api-key` value.
    pub api_key: Arc<str>,
}

impl AppState {
    /// Builds both services over one store.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>, api_key: &str) -> Self {
        Self {
            registrations: Arc::new(RegistrationService::new(Arc::clone(&store))),
            queries: Arc::new(QueryService::new(store)),
            api_key: Arc::from(api_key),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("registrations", &self.registrations)
            .field("queries", &self.queries)
            .finish_non_exhaustive()
    }
}
