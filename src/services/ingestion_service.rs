//! src/services/ingestion_service.rs
//!
//! Ingestion orchestrator for storage change events.
//!
//! One invocation authenticates once against the identity provider, then
//! reads every record's object strictly in order. The first unreadable object
//! fails the whole batch; later records are never touched. The outcome is one
//! of four fixed messages and no error ever escapes.

use crate::{
    models::event::ChangeEvent,
    services::{identity_service::IdentityGate, object_reader::ObjectReader},
};
use std::{fmt, sync::Arc};
use tracing::{debug, error, info};

/// Terminal state of one ingestion invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestionOutcome {
    NoRecords,
    AuthenticationFailed,
    FileReadFailed,
    Completed,
}

impl IngestionOutcome {
    /// Exact message returned to the trigger source.
    pub fn as_str(self) -> &'static str {
        match self {
            IngestionOutcome::NoRecords => "No records found in the event.",
            IngestionOutcome::AuthenticationFailed => "Authentication failed.",
            IngestionOutcome::FileReadFailed => "File read failed.",
            IngestionOutcome::Completed => "Processing completed.",
        }
    }
}

impl fmt::Display for IngestionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct IngestionService {
    identity: Arc<dyn IdentityGate>,
    reader: Arc<dyn ObjectReader>,
}

impl IngestionService {
    pub fn new(identity: Arc<dyn IdentityGate>, reader: Arc<dyn ObjectReader>) -> Self {
        Self { identity, reader }
    }

    pub async fn process(&self, event: &ChangeEvent) -> IngestionOutcome {
        let records = event.records();
        if records.is_empty() {
            debug!("Event carried no records");
            return IngestionOutcome::NoRecords;
        }

        if self.identity.acquire_credential().await.is_none() {
            error!("Failed to acquire identity provider access token.");
            return IngestionOutcome::AuthenticationFailed;
        }
        info!("Successfully authenticated with identity provider.");

        for record in records {
            let bucket = record.bucket_name();
            let key = record.object_key();
            info!("Processing file {} from bucket {}.", key, bucket);

            let Some(content) = self.reader.read(bucket, key).await else {
                error!("Failed to read file {} from bucket {}.", key, bucket);
                return IngestionOutcome::FileReadFailed;
            };

            info!("File content: {}", content);
        }

        IngestionOutcome::Completed
    }
}
