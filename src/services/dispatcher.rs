//! src/services/dispatcher.rs
//!
//! Notification dispatcher: pushes one envelope to one gateway connection.
//! A management client is built for every call from the caller's own
//! endpoint and dropped afterwards; nothing is pooled or cached.

use crate::models::notification::NotificationEnvelope;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_apigatewaymanagement::{Client, error::DisplayErrorContext, primitives::Blob};
use thiserror::Error;
use tracing::debug;

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Push `envelope` to `connection_id` through the gateway at `endpoint`.
    async fn dispatch(
        &self,
        endpoint: &str,
        connection_id: &str,
        envelope: &NotificationEnvelope,
    ) -> Result<(), DispatchError>;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("connection `{0}` is no longer available")]
    Gone(String),
    #[error("push to connection `{connection_id}` failed: {message}")]
    Push {
        connection_id: String,
        message: String,
    },
}

/// Pushes through the gateway's connection management API.
#[derive(Clone)]
pub struct GatewayDispatcher {
    sdk_config: SdkConfig,
}

impl GatewayDispatcher {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client_for(&self, endpoint: &str) -> Client {
        let config = aws_sdk_apigatewaymanagement::config::Builder::from(&self.sdk_config)
            .endpoint_url(endpoint)
            .build();
        Client::from_conf(config)
    }
}

#[async_trait]
impl NotificationDispatcher for GatewayDispatcher {
    async fn dispatch(
        &self,
        endpoint: &str,
        connection_id: &str,
        envelope: &NotificationEnvelope,
    ) -> Result<(), DispatchError> {
        let data = envelope.to_bytes()?;
        let client = self.client_for(endpoint);

        let output = client
            .post_to_connection()
            .connection_id(connection_id)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_gone_exception())
                {
                    DispatchError::Gone(connection_id.to_string())
                } else {
                    DispatchError::Push {
                        connection_id: connection_id.to_string(),
                        message: DisplayErrorContext(&err).to_string(),
                    }
                }
            })?;

        debug!("Push response: {:?}", output);
        Ok(())
    }
}
