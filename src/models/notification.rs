//! Represents the tagged envelope pushed to a client connection.

use crate::models::status::StatusSettings;
use serde::{Deserialize, Serialize};

/// Action tag identifying a status snapshot push.
pub const STATUS_INFO_ACTION: &str = "getstatusinfo";

/// Wire payload delivered out-of-band to a single connection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NotificationEnvelope {
    /// Tells the receiver how to interpret `settings`.
    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Settings")]
    pub settings: StatusSettings,
}

impl NotificationEnvelope {
    pub fn status_info(settings: StatusSettings) -> Self {
        Self {
            action: STATUS_INFO_ACTION.into(),
            settings,
        }
    }

    /// Canonical JSON encoding sent over the connection.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
