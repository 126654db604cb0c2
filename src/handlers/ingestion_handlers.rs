//! HTTP adapter for storage change events.

use crate::{models::event::ChangeEvent, state::AppState};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// `POST /invocations/object-created`
///
/// Always answers 200 with the plain-text outcome; ingestion failures are
/// reported in the body, never as HTTP errors.
pub async fn object_created(
    State(state): State<AppState>,
    Json(event): Json<ChangeEvent>,
) -> impl IntoResponse {
    let span = info_span!("ingestion", invocation = %Uuid::new_v4());
    let outcome = state.ingestion.process(&event).instrument(span).await;
    (StatusCode::OK, outcome.as_str())
}
