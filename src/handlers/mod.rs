pub mod health_handlers;
pub mod ingestion_handlers;
pub mod notification_handlers;
