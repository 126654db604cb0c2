//! src/services/notification_service.rs
//!
//! Status notification orchestrator.
//!
//! The caller gets a synchronous acknowledgment, while the status snapshot
//! itself travels out-of-band as a push to the caller's connection. The
//! caller must carry a non-empty identity claim before anything is pushed.
//! Push failures are not swallowed: there is no other delivery path, so
//! they fail the invocation.

use crate::{
    logging::LogLevelHandle,
    models::{
        connection::{ConnectionAck, ConnectionRequest},
        notification::NotificationEnvelope,
    },
    services::{
        authorizer::authorize,
        dispatcher::{DispatchError, NotificationDispatcher},
        status_source::{StatusError, StatusSource},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Unknown user")]
    UnknownUser,
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Clone)]
pub struct NotificationService {
    status: Arc<dyn StatusSource>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    log_level: Option<LogLevelHandle>,
}

impl NotificationService {
    pub fn new(
        status: Arc<dyn StatusSource>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            status,
            dispatcher,
            log_level: None,
        }
    }

    /// Follow the status snapshot's level for the process-wide log filter.
    pub fn with_log_level(mut self, handle: LogLevelHandle) -> Self {
        self.log_level = Some(handle);
        self
    }

    /// Loads the status snapshot and discards it; used by readiness checks.
    pub async fn status_available(&self) -> Result<(), StatusError> {
        self.status.current_status().await.map(|_| ())
    }

    pub async fn handle(
        &self,
        request: &ConnectionRequest,
    ) -> Result<ConnectionAck, NotificationError> {
        let settings = self.status.current_status().await.inspect_err(|err| {
            error!("Status snapshot unavailable: {}", err);
        })?;
        if let Some(handle) = &self.log_level {
            handle.apply(settings.level());
        }
        debug!("GetStatusInfo entered (status level {})", settings.level());

        let context = &request.request_context;
        let endpoint = context.management_endpoint();
        debug!("Gateway management endpoint: {}", endpoint);
        debug!("ConnectionId: {}", context.connection_id);

        let Some(user) = authorize(context) else {
            error!("Unauthenticated access detected");
            return Err(NotificationError::UnknownUser);
        };
        debug!("Caller {} authorized", user);

        let envelope = NotificationEnvelope::status_info(settings);
        debug!("Ready to send answer");
        self.dispatcher
            .dispatch(&endpoint, &context.connection_id, &envelope)
            .await
            .inspect_err(|err| error!("Push to {} failed: {}", context.connection_id, err))?;
        debug!("After send answer");

        Ok(ConnectionAck::connected())
    }
}
