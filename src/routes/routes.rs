//! Defines routes for the two invocation handlers.
//!
//! ## Structure
//! - **Health**
//!   - `GET  /healthz` — liveness
//!   - `GET  /readyz` — status store reachability
//!
//! - **Invocations**
//!   - `POST /invocations/object-created` — storage change event, plain-text outcome
//!   - `POST /invocations/status-info` — connection message, JSON acknowledgment

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        ingestion_handlers::object_created,
        notification_handlers::status_info,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all invocation routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/invocations/object-created", post(object_created))
        .route("/invocations/status-info", post(status_info))
}
