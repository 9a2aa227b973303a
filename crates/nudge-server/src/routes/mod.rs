//! Route definitions for the classification server.

mod check;
mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/check-notification", post(check::check_notification))
        .with_state(state)
}

pub use check::*;
pub use health::*;
