use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt};

const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Where ingested objects are read from.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectBackend {
    S3,
    Local,
}

/// Where the status snapshot lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusLocation {
    Bucket { bucket: String, key: String },
    File(String),
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub token_cache: bool,
    pub object_backend: ObjectBackend,
    pub object_root: String,
    pub status: StatusLocation,
    pub aws_region: Option<String>,
    pub aws_endpoint: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Storage intake and connection status gateway")]
pub struct Args {
    /// Host to bind to (overrides INTAKE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides INTAKE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Identity provider authority URL (overrides INTAKE_IDENTITY_AUTHORITY)
    #[arg(long)]
    pub authority: Option<String>,

    /// Confidential client id (overrides INTAKE_CLIENT_ID)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Requested scope; repeatable (overrides comma-separated INTAKE_SCOPES)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Reuse access tokens until shortly before they expire
    #[arg(long)]
    pub token_cache: bool,

    /// Object backend (overrides INTAKE_OBJECT_BACKEND)
    #[arg(long, value_enum)]
    pub object_backend: Option<ObjectBackend>,

    /// Root directory for the local object backend (overrides INTAKE_OBJECT_ROOT)
    #[arg(long)]
    pub object_root: Option<String>,

    /// Bucket holding the status document (overrides INTAKE_STATUS_BUCKET)
    #[arg(long)]
    pub status_bucket: Option<String>,

    /// Key of the status document (overrides INTAKE_STATUS_KEY)
    #[arg(long)]
    pub status_key: Option<String>,

    /// Local status document; takes precedence over the bucket (overrides INTAKE_STATUS_FILE)
    #[arg(long)]
    pub status_file: Option<String>,

    /// AWS region (overrides INTAKE_AWS_REGION)
    #[arg(long)]
    pub aws_region: Option<String>,

    /// Custom object store endpoint, e.g. a local emulator (overrides INTAKE_AWS_ENDPOINT)
    #[arg(long)]
    pub aws_endpoint: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_parts(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge parsed arguments over values looked up through `env`.
    ///
    /// The client secret is only read from the environment so it never shows
    /// up in process listings.
    pub fn from_parts(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match args.port {
            Some(port) => port,
            None => match env("INTAKE_PORT") {
                Some(value) => value
                    .parse::<u16>()
                    .with_context(|| format!("parsing INTAKE_PORT value `{}`", value))?,
                None => 3000,
            },
        };

        let authority = args
            .authority
            .or_else(|| env("INTAKE_IDENTITY_AUTHORITY"))
            .context("identity authority is required (INTAKE_IDENTITY_AUTHORITY)")?;
        let client_id = args
            .client_id
            .or_else(|| env("INTAKE_CLIENT_ID"))
            .context("client id is required (INTAKE_CLIENT_ID)")?;
        let client_secret = env("INTAKE_CLIENT_SECRET")
            .context("client secret is required (INTAKE_CLIENT_SECRET)")?;

        let mut scopes = args.scopes;
        if scopes.is_empty() {
            scopes = env("INTAKE_SCOPES")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
        }
        if scopes.is_empty() {
            scopes.push(DEFAULT_SCOPE.into());
        }

        let object_backend = match args.object_backend {
            Some(backend) => backend,
            None => match env("INTAKE_OBJECT_BACKEND") {
                Some(value) => ObjectBackend::from_str(&value, true).map_err(|err| {
                    anyhow::anyhow!("parsing INTAKE_OBJECT_BACKEND value `{}`: {}", value, err)
                })?,
                None => ObjectBackend::S3,
            },
        };

        let token_cache = args.token_cache
            || env("INTAKE_TOKEN_CACHE")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let status = match args.status_file.or_else(|| env("INTAKE_STATUS_FILE")) {
            Some(path) => StatusLocation::File(path),
            None => match args.status_bucket.or_else(|| env("INTAKE_STATUS_BUCKET")) {
                Some(bucket) => StatusLocation::Bucket {
                    bucket,
                    key: args
                        .status_key
                        .or_else(|| env("INTAKE_STATUS_KEY"))
                        .unwrap_or_else(|| "status.json".into()),
                },
                None => bail!("a status bucket (INTAKE_STATUS_BUCKET) or file (INTAKE_STATUS_FILE) is required"),
            },
        };

        Ok(Self {
            host: args
                .host
                .or_else(|| env("INTAKE_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port,
            authority,
            client_id,
            client_secret,
            scopes,
            token_cache,
            object_backend,
            object_root: args
                .object_root
                .or_else(|| env("INTAKE_OBJECT_ROOT"))
                .unwrap_or_else(|| "./data/objects".into()),
            status,
            aws_region: args.aws_region.or_else(|| env("INTAKE_AWS_REGION")),
            aws_endpoint: args.aws_endpoint.or_else(|| env("INTAKE_AWS_ENDPOINT")),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("token_cache", &self.token_cache)
            .field("object_backend", &self.object_backend)
            .field("object_root", &self.object_root)
            .field("status", &self.status)
            .field("aws_region", &self.aws_region)
            .field("aws_endpoint", &self.aws_endpoint)
            .finish()
    }
}
