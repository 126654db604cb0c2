//! Core data models for the intake gateway.
//!
//! These types describe what arrives on each trigger (storage change events,
//! connection messages) and what leaves the service (acknowledgments, pushed
//! envelopes). They serialize as JSON via `serde`.

pub mod connection;
pub mod credential;
pub mod event;
pub mod notification;
pub mod status;
