//! Shared state for the HTTP adapter.

use crate::app::Application;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

impl AppState {
    pub fn new(app: Application) -> Self {
        AppState { app: Arc::new(app) }
    }
}
