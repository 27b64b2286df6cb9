//! Read-only access to partition-scoped document indices

use crate::document::KmerDocument;
use async_trait::async_trait;
use kmerdex_core::IndexName;
use std::sync::Arc;
use thiserror::Error;

/// Failure talking to the document index
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid index URL '{0}'")]
    InvalidUrl(String),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Point and batch reads of k-mer documents.
///
/// A missing document is `Ok(None)` (or simply absent from a multi-get),
/// never an error.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn get(&self, index: &IndexName, id: &str)
        -> Result<Option<KmerDocument>, TransportError>;

    /// Found documents keyed by id, in response order
    async fn multi_get(
        &self,
        index: &IndexName,
        ids: &[String],
    ) -> Result<Vec<(String, KmerDocument)>, TransportError>;
}

#[async_trait]
impl<T: DocumentIndex + ?Sized> DocumentIndex for Arc<T> {
    async fn get(
        &self,
        index: &IndexName,
        id: &str,
    ) -> Result<Option<KmerDocument>, TransportError> {
        (**self).get(index, id).await
    }

    async fn multi_get(
        &self,
        index: &IndexName,
        ids: &[String],
    ) -> Result<Vec<(String, KmerDocument)>, TransportError> {
        (**self).multi_get(index, ids).await
    }
}
