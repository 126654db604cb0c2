//! HTTP adapter for connection status requests.

use crate::{
    errors::AppError,
    models::connection::{ConnectionAck, ConnectionRequest},
    state::AppState,
};
use axum::{Json, extract::State};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// `POST /invocations/status-info`
///
/// Returns the acknowledgment once the snapshot has been pushed. Unknown
/// callers map to 401 and push failures to 502.
pub async fn status_info(
    State(state): State<AppState>,
    Json(request): Json<ConnectionRequest>,
) -> Result<Json<ConnectionAck>, AppError> {
    let span = info_span!(
        "status_info",
        invocation = %Uuid::new_v4(),
        connection_id = %request.request_context.connection_id,
    );
    let ack = state.notification.handle(&request).instrument(span).await?;
    Ok(Json(ack))
}
