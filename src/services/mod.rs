//! Collaborators and orchestrators behind the two invocation handlers.
//!
//! Every external dependency sits behind a trait (`IdentityGate`,
//! `ObjectReader`, `StatusSource`, `NotificationDispatcher`) and is injected
//! at construction, so tests can substitute in-memory doubles.

pub mod authorizer;
pub mod dispatcher;
pub mod identity_service;
pub mod ingestion_service;
pub mod notification_service;
pub mod object_reader;
pub mod status_source;
