//! Application state shared across handlers.

use ledgerlens_providers::ProviderKind;
use std::sync::Arc;

use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub provider: ProviderKind,
    /// Model override; each provider has a sensible default
    pub model: Option<String>,
}

impl AppState {
    pub fn new(store: Store, provider: ProviderKind, model: Option<String>) -> Self {
        Self { store: Arc::new(store), provider, model }
    }
}
