use crate::models::status::StatusLevel;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Handle onto the runtime-adjustable verbosity filter.
///
/// `RUST_LOG` still applies on top; this handle narrows or widens what the
/// status snapshot asks for.
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: reload::Handle<LevelFilter, Registry>,
}

impl LogLevelHandle {
    pub fn apply(&self, level: StatusLevel) {
        let filter = level.as_level_filter();
        if let Err(err) = self.inner.modify(|current| *current = filter) {
            tracing::warn!("Could not apply status log level {}: {}", level, err);
        }
    }
}

/// Install the global subscriber and return the level handle.
pub fn init(initial: LevelFilter) -> LogLevelHandle {
    let (level_layer, inner) = reload::Layer::new(initial);
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(level_layer)
        .with(env_filter)
        .with(fmt::layer())
        .init();

    LogLevelHandle { inner }
}
