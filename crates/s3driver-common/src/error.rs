use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0} is not a valid resource id")]
    InvalidResourceId(String),
    #[error("invalid resource type: {0:?}")]
    InvalidResourceType(String),
    #[error("unable to process the request: {0}")]
    UnprocessableInput(String),
    #[error("invalid driver parameters: {0}")]
    InvalidDriverParams(String),
    #[error("bad credentials: {0}")]
    Credentials(String),
    #[error("unable to parse the resource token: {0}")]
    TokenDecode(String),
    #[error("incomplete resource token: {0}")]
    IncompleteToken(String),
    #[error("configuring storage client: {0}")]
    StorageConfig(String),
    #[error("{message}: {reason}")]
    Provisioning {
        message: String,
        reason: String,
        details: Map<String, Value>,
    },
    #[error("failed to get status of bucket {bucket:?}: {reason}")]
    StatusUnavailable { bucket: String, reason: String },
    #[error("storage backend error: {0}")]
    Storage(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("request did not complete within {0:?}")]
    RequestTimeout(Duration),
}

impl DriverError {
    pub fn provisioning(message: impl Into<String>, reason: impl ToString) -> Self {
        Self::Provisioning {
            message: message.into(),
            reason: reason.to_string(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Self::Provisioning { details, .. } = &mut self {
            details.insert(key.to_string(), value.into());
        }
        self
    }

    /// Stable machine-readable code reported in error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "API-001",
            Self::InvalidResourceId(_) => "API-002",
            Self::UnprocessableInput(_) => "API-003",
            Self::InvalidResourceType(_) => "API-004",
            Self::InvalidDriverParams(_) => "API-005",
            Self::RequestTimeout(_) => "API-006",
            Self::TokenDecode(_) => "RES-101",
            Self::StorageConfig(_) => "RES-102",
            Self::Credentials(_) => "RES-103",
            Self::Provisioning { .. } | Self::Storage(_) => "RES-104",
            Self::StatusUnavailable { .. } => "RES-105",
            Self::IncompleteToken(_) => "RES-106",
        }
    }

    pub fn details(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Provisioning { details, .. } if !details.is_empty() => Some(details),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
