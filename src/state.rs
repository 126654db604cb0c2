use crate::{
    config::{AppConfig, ObjectBackend, StatusLocation},
    logging::LogLevelHandle,
    services::{
        dispatcher::GatewayDispatcher,
        identity_service::{CachedIdentityGate, ClientCredentials, ClientCredentialsGate, IdentityGate},
        ingestion_service::IngestionService,
        notification_service::NotificationService,
        object_reader::{LocalObjectReader, ObjectReader, S3ObjectReader},
        status_source::{FileStatusSource, S3StatusSource, StatusSource},
    },
};
use anyhow::Result;
use aws_config::SdkConfig;
use std::sync::Arc;

/// Shared, immutable handler dependencies. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub ingestion: IngestionService,
    pub notification: NotificationService,
}

impl AppState {
    pub fn new(ingestion: IngestionService, notification: NotificationService) -> Self {
        Self {
            ingestion,
            notification,
        }
    }

    /// Wire the production collaborators selected by `cfg`.
    pub fn from_config(
        cfg: &AppConfig,
        sdk_config: &SdkConfig,
        log_level: LogLevelHandle,
    ) -> Result<Self> {
        let mut s3_builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &cfg.aws_endpoint {
            s3_builder = s3_builder.endpoint_url(endpoint).force_path_style(true);
        }
        let s3_reader = S3ObjectReader::new(aws_sdk_s3::Client::from_conf(s3_builder.build()));

        let mut identity: Arc<dyn IdentityGate> =
            Arc::new(ClientCredentialsGate::new(ClientCredentials {
                authority: cfg.authority.clone(),
                client_id: cfg.client_id.clone(),
                client_secret: cfg.client_secret.clone(),
                scopes: cfg.scopes.clone(),
            })?);
        if cfg.token_cache {
            identity = Arc::new(CachedIdentityGate::new(identity));
        }

        let reader: Arc<dyn ObjectReader> = match cfg.object_backend {
            ObjectBackend::S3 => Arc::new(s3_reader.clone()),
            ObjectBackend::Local => Arc::new(LocalObjectReader::new(&cfg.object_root)),
        };

        let status: Arc<dyn StatusSource> = match &cfg.status {
            StatusLocation::Bucket { bucket, key } => {
                Arc::new(S3StatusSource::new(s3_reader, bucket.clone(), key.clone()))
            }
            StatusLocation::File(path) => Arc::new(FileStatusSource::new(path)),
        };

        let notification =
            NotificationService::new(status, Arc::new(GatewayDispatcher::new(sdk_config.clone())))
                .with_log_level(log_level);

        Ok(Self::new(IngestionService::new(identity, reader), notification))
    }
}
