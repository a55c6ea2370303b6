use std::path::PathBuf;
use thiserror::Error;

/// Rejected prompt configuration. Raised before any terminal I/O happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("autocomplete.suggest_col_count must be at least 1")]
    ZeroColumns,

    #[error("autocomplete.trigger_key {0} is not a 7-bit key code")]
    TriggerOutOfRange(u8),

    #[error("autocomplete.trigger_key {key} is reserved for {role}")]
    ReservedTrigger { key: u8, role: &'static str },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
