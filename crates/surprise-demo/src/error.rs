use std::path::PathBuf;

use surprise_core::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to load config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("simulation did not settle within {limit_ms} ms of virtual time")]
    DidNotSettle { limit_ms: u64 },
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::InvalidArgument { .. } => 64,
            Self::DidNotSettle { .. } => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
