//! Shared application state for the HTTP API.

use marksheet_db::PgStore;
use marksheet_grading::GradingPolicy;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. The policy is loaded once at startup and never changes.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database access.
    pub store: PgStore,
    /// Pass rule, thresholds and CGPA mode.
    pub policy: GradingPolicy,
}

impl AppState {
    /// Create application state from a store and grading policy.
    pub const fn new(store: PgStore, policy: GradingPolicy) -> Self {
        Self { store, policy }
    }
}
