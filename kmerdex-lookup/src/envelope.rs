//! Caller-facing error envelope: `{"has_errors": "<KIND>", "message": "..."}`

use crate::service::LookupError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingSamples,
    UnroutableKmer,
    InvalidSequence,
    TransportError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub has_errors: ErrorKind,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            has_errors: kind,
            message: message.into(),
        }
    }
}

impl From<&LookupError> for ErrorEnvelope {
    fn from(err: &LookupError) -> Self {
        let kind = match err {
            LookupError::MissingSampleScope => ErrorKind::MissingSamples,
            LookupError::Unroutable(_) => ErrorKind::UnroutableKmer,
            LookupError::InvalidSequence(_) => ErrorKind::InvalidSequence,
            LookupError::Transport { .. } => ErrorKind::TransportError,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<LookupError> for ErrorEnvelope {
    fn from(err: LookupError) -> Self {
        Self::from(&err)
    }
}
