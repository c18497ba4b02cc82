//! Application state for the web layer.

use std::sync::Arc;

use crate::registry::Registry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Every sensor scope and its refresh handle
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}
