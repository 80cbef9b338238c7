use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Persistence,
    Host,
    MalformedState,
}

#[derive(Debug, Error)]
pub enum BarError {
    #[error("illegal argument: {name}")]
    InvalidArgument { name: &'static str },
    #[error("failed to access persisted state under '{key}': {source}")]
    Persistence {
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("host failed to {operation}: {source}")]
    Host {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("persisted state under '{key}' is malformed: {source}")]
    MalformedState {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BarError {
    pub fn invalid_argument(name: &'static str) -> Self {
        Self::InvalidArgument { name }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Persistence { .. } => ErrorCode::Persistence,
            Self::Host { .. } => ErrorCode::Host,
            Self::MalformedState { .. } => ErrorCode::MalformedState,
        }
    }
}

pub type BarResult<T> = Result<T, BarError>;
