use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BatchError>;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("dispatch list {path} cannot be opened: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch worker '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to confirm exit of pid {pid}: {source}")]
    ProcessWait {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deliver SIG{signal} to pid {pid}: {reason}")]
    Signal {
        signal: &'static str,
        pid: u32,
        reason: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}
