//! src/services/identity_service.rs
//!
//! Identity gate: obtains a bearer credential from an external identity
//! provider through a client-credentials exchange. Failures never reach the
//! caller as errors; they surface as an absent credential plus an error log,
//! so each orchestrator decides whether absence is fatal.

use crate::models::credential::AccessCredential;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::{collections::BTreeSet, sync::Arc, time::Duration as StdDuration};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Lifetime assumed when the provider omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3599;

/// Reuse a cached credential only while it has at least this much life left.
const CACHE_EXPIRY_MARGIN_SECS: i64 = 60;

/// Upper bound on one token request, connect through body.
const TOKEN_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

#[async_trait]
pub trait IdentityGate: Send + Sync {
    /// Perform one exchange attempt. `None` on any failure.
    async fn acquire_credential(&self) -> Option<AccessCredential>;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider rejected the exchange ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("identity provider returned an empty access token")]
    EmptyToken,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Static settings for a confidential client.
#[derive(Clone)]
pub struct ClientCredentials {
    /// Authority base URL, e.g. `https://login.microsoftonline.com/{tenant}`.
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    expires_in: Option<i64>,
    scope: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Client-credentials exchange against `{authority}/oauth2/v2.0/token`.
#[derive(Clone)]
pub struct ClientCredentialsGate {
    http: reqwest::Client,
    token_url: String,
    credentials: ClientCredentials,
}

impl ClientCredentialsGate {
    pub fn new(credentials: ClientCredentials) -> Result<Self, IdentityError> {
        Self::with_timeout(credentials, TOKEN_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        credentials: ClientCredentials,
        timeout: StdDuration,
    ) -> Result<Self, IdentityError> {
        let token_url = format!(
            "{}/oauth2/v2.0/token",
            credentials.authority.trim_end_matches('/')
        );
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            token_url,
            credentials,
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    async fn exchange(&self) -> Result<AccessCredential, IdentityError> {
        let scope = self.credentials.scopes.join(" ");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        debug!("Requesting client credential token from {}", self.token_url());
        let response = self.http.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<TokenErrorResponse>().await {
                Ok(body) => body
                    .error_description
                    .or(body.error)
                    .unwrap_or_else(|| "no error details".into()),
                Err(_) => "unreadable error body".into(),
            };
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(IdentityError::EmptyToken);
        }

        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let scopes = match token.scope {
            Some(granted) => granted.split_whitespace().map(str::to_string).collect(),
            None => self.credentials.scopes.iter().cloned().collect::<BTreeSet<_>>(),
        };

        Ok(AccessCredential {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
            scopes,
        })
    }
}

#[async_trait]
impl IdentityGate for ClientCredentialsGate {
    async fn acquire_credential(&self) -> Option<AccessCredential> {
        match self.exchange().await {
            Ok(credential) => Some(credential),
            Err(err) => {
                error!("Error acquiring token: {}", err);
                None
            }
        }
    }
}

/// Wraps another gate and reuses its credential until shortly before expiry.
///
/// Failures are never cached: a failed exchange leaves the slot untouched and
/// the next call tries again. The slot is not locked during the exchange, so
/// concurrent misses may each run one; the last success wins.
pub struct CachedIdentityGate {
    inner: Arc<dyn IdentityGate>,
    cached: Mutex<Option<AccessCredential>>,
    margin: Duration,
}

impl CachedIdentityGate {
    pub fn new(inner: Arc<dyn IdentityGate>) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
            margin: Duration::seconds(CACHE_EXPIRY_MARGIN_SECS),
        }
    }
}

#[async_trait]
impl IdentityGate for CachedIdentityGate {
    async fn acquire_credential(&self) -> Option<AccessCredential> {
        {
            let slot = self.cached.lock().await;
            if let Some(credential) = slot
                .as_ref()
                .filter(|credential| credential.is_valid_at(Utc::now(), self.margin))
            {
                debug!("Reusing cached access token");
                return Some(credential.clone());
            }
        }

        let fresh = self.inner.acquire_credential().await;
        if let Some(credential) = &fresh {
            *self.cached.lock().await = Some(credential.clone());
        }
        fresh
    }
}
