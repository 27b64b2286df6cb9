//! HTTP client for an Elasticsearch-style document index
//!
//! - point get: `GET {base}/{index}/{doc_type}/{id}`
//! - multi-get: `POST {base}/{index}/{doc_type}/_mget` with `{"ids": [...]}`

use crate::document::{GetResponse, KmerDocument, MultiGetResponse};
use crate::index::{DocumentIndex, TransportError};
use async_trait::async_trait;
use kmerdex_core::config::IndexConfig;
use kmerdex_core::IndexName;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpIndex {
    client: Client,
    base_url: String,
    doc_type: String,
}

/// Validated base URL without a trailing slash
pub(crate) fn normalize_base_url(url: &str) -> Result<String, TransportError> {
    let parsed = Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.trim_end_matches('/').to_string()),
        _ => Err(TransportError::InvalidUrl(url.to_string())),
    }
}

/// Shared client with the configured request and connect timeouts
pub(crate) fn build_client(config: &IndexConfig) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .map_err(|e| TransportError::Http {
            url: config.url.clone(),
            message: e.to_string(),
        })
}

impl HttpIndex {
    pub fn new(config: &IndexConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: normalize_base_url(&config.url)?,
            doc_type: config.doc_type.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn document_url(&self, index: &IndexName, id: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, index, self.doc_type, id)
    }

    fn mget_url(&self, index: &IndexName) -> String {
        format!("{}/{}/{}/_mget", self.base_url, index, self.doc_type)
    }

    async fn decode<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn decode_document(url: &str, doc: GetResponse) -> Result<Option<KmerDocument>, TransportError> {
        match (doc.found, doc.source) {
            (true, Some(raw)) => KmerDocument::try_from(raw)
                .map(Some)
                .map_err(|e| TransportError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl DocumentIndex for HttpIndex {
    async fn get(
        &self,
        index: &IndexName,
        id: &str,
    ) -> Result<Option<KmerDocument>, TransportError> {
        let url = self.document_url(index, id);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc: GetResponse = Self::decode(&url, response).await?;
                Self::decode_document(&url, doc)
            }
            status => Err(TransportError::Status {
                url,
                status: status.as_u16(),
            }),
        }
    }

    async fn multi_get(
        &self,
        index: &IndexName,
        ids: &[String],
    ) -> Result<Vec<(String, KmerDocument)>, TransportError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.mget_url(index);
        tracing::debug!("POST {} ({} ids)", url, ids.len());

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: MultiGetResponse = Self::decode(&url, response).await?;
        let mut found = Vec::new();
        for doc in body.docs {
            let id = doc.id.clone();
            if let Some(document) = Self::decode_document(&url, doc)? {
                found.push((id, document));
            }
        }
        Ok(found)
    }
}
