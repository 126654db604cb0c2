//! Represents the current system status snapshot pushed to connected clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::level_filters::LevelFilter;

/// Key of the verbosity level inside the status document.
const LEVEL_FIELD: &str = "Level";

/// Status snapshot owned by the status store.
///
/// The document is kept and re-serialized exactly as stored, `Level`
/// included. The parsed level is only consulted for the log filter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct StatusSettings {
    level: StatusLevel,
    document: Map<String, Value>,
}

impl StatusSettings {
    /// Diagnostic verbosity the system is currently running at.
    /// `Information` when the document carries no `Level`.
    pub fn level(&self) -> StatusLevel {
        self.level
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.document.get(field)
    }
}

impl TryFrom<Map<String, Value>> for StatusSettings {
    type Error = String;

    fn try_from(document: Map<String, Value>) -> Result<Self, String> {
        let level = match document.get(LEVEL_FIELD) {
            Some(raw) => StatusLevel::deserialize(raw).map_err(|err| err.to_string())?,
            None => StatusLevel::default(),
        };
        Ok(Self { level, document })
    }
}

impl From<StatusSettings> for Map<String, Value> {
    fn from(settings: StatusSettings) -> Self {
        settings.document
    }
}

/// Verbosity level recorded in the status snapshot.
///
/// Deserializes from either the level name (case-insensitive) or its numeric
/// index (`0` = `Verbose` .. `5` = `Fatal`).
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "RawLevel")]
pub enum StatusLevel {
    Verbose,
    Debug,
    #[default]
    Information,
    Warning,
    Error,
    Fatal,
}

const LEVELS: [StatusLevel; 6] = [
    StatusLevel::Verbose,
    StatusLevel::Debug,
    StatusLevel::Information,
    StatusLevel::Warning,
    StatusLevel::Error,
    StatusLevel::Fatal,
];

impl StatusLevel {
    /// Tracing filter matching this level. `Fatal` has no tracing
    /// counterpart and maps to `ERROR`.
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            StatusLevel::Verbose => LevelFilter::TRACE,
            StatusLevel::Debug => LevelFilter::DEBUG,
            StatusLevel::Information => LevelFilter::INFO,
            StatusLevel::Warning => LevelFilter::WARN,
            StatusLevel::Error | StatusLevel::Fatal => LevelFilter::ERROR,
        }
    }

    fn name(self) -> &'static str {
        match self {
            StatusLevel::Verbose => "Verbose",
            StatusLevel::Debug => "Debug",
            StatusLevel::Information => "Information",
            StatusLevel::Warning => "Warning",
            StatusLevel::Error => "Error",
            StatusLevel::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Name(String),
    Index(u64),
}

impl TryFrom<RawLevel> for StatusLevel {
    type Error = String;

    fn try_from(raw: RawLevel) -> Result<Self, String> {
        match raw {
            RawLevel::Name(name) => LEVELS
                .iter()
                .copied()
                .find(|level| level.name().eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| format!("unknown status level `{}`", name)),
            RawLevel::Index(index) => usize::try_from(index)
                .ok()
                .and_then(|i| LEVELS.get(i).copied())
                .ok_or_else(|| format!("status level index {} out of range", index)),
        }
    }
}
