//! Inbound messages arriving on a persistent gateway connection, and the
//! synchronous acknowledgment returned for them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One message received on a persistent connection.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ConnectionRequest {
    #[serde(rename = "requestContext", alias = "RequestContext", default)]
    pub request_context: RequestContext,
}

/// Routing and authorizer details the gateway attaches to every message.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Gateway domain the client is connected through.
    #[serde(alias = "DomainName", default)]
    pub domain_name: String,

    /// Deployment stage of the gateway (e.g. "prod").
    #[serde(alias = "Stage", default)]
    pub stage: String,

    /// Identifier of the caller's live connection.
    #[serde(alias = "ConnectionId", default)]
    pub connection_id: String,

    /// Claims produced by the gateway's authorizer, if one ran.
    #[serde(alias = "Authorizer", default)]
    pub authorizer: Option<HashMap<String, Value>>,
}

impl RequestContext {
    /// Management endpoint used to push messages back to this connection.
    pub fn management_endpoint(&self) -> String {
        format!("https://{}/{}", self.domain_name, self.stage)
    }
}

/// Synchronous acknowledgment returned to the triggering channel.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAck {
    pub status_code: u16,
    pub body: String,
}

impl ConnectionAck {
    pub fn connected() -> Self {
        Self {
            status_code: 200,
            body: "Connected.".into(),
        }
    }
}
