//! Bearer credential issued by the identity provider.

use chrono::{DateTime, Duration, Utc};
use std::{collections::BTreeSet, fmt};

/// Short-lived bearer token proving the service may act on its own behalf.
#[derive(Clone)]
pub struct AccessCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub scopes: BTreeSet<String>,
}

impl AccessCredential {
    /// True while the token stays valid for at least `margin` past `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        !self.token.is_empty() && now + margin < self.expires_at
    }
}

// Never print the token itself.
impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCredential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}
