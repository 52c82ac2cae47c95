//! Shared application state for all routes.

use crate::config::DEFAULT_BODY_LIMIT;

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl<S> AppState<S> {
    pub fn new(store: S) -> Self {
        AppState {
            store,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}
