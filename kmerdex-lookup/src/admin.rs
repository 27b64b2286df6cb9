//! Creation of the partition-scoped indices

use crate::http::{build_client, normalize_base_url};
use crate::index::TransportError;
use kmerdex_core::config::IndexConfig;
use kmerdex_core::IndexName;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

/// Settings applied to every created index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSettings {
    pub shards: u32,
    pub replicas: u32,
    pub doc_type: String,
    /// Alias every partition index joins, so all k-mers can be searched at once
    pub alias: String,
}

impl From<&IndexConfig> for IndexSettings {
    fn from(config: &IndexConfig) -> Self {
        Self {
            shards: config.shards,
            replicas: config.replicas,
            doc_type: config.doc_type.clone(),
            alias: config.alias.clone(),
        }
    }
}

impl IndexSettings {
    /// Request body for index creation
    pub fn body(&self) -> Value {
        let mut mappings = serde_json::Map::new();
        mappings.insert(
            self.doc_type.clone(),
            json!({
                "properties": {
                    "count": {"type": "long"},
                    "samples": {"type": "keyword"}
                }
            }),
        );
        let mut aliases = serde_json::Map::new();
        aliases.insert(self.alias.clone(), json!({}));

        json!({
            "settings": {
                "number_of_shards": self.shards,
                "number_of_replicas": self.replicas
            },
            "mappings": mappings,
            "aliases": aliases
        })
    }
}

pub struct IndexAdmin {
    client: Client,
    base_url: String,
    settings: IndexSettings,
}

impl IndexAdmin {
    pub fn new(config: &IndexConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: normalize_base_url(&config.url)?,
            settings: IndexSettings::from(config),
        })
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// `PUT {base}/{index}` with the k-mer mapping
    pub async fn create_index(&self, index: &IndexName) -> Result<(), TransportError> {
        let url = format!("{}/{}", self.base_url, index);
        let response = self
            .client
            .put(&url)
            .json(&self.settings.body())
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
        tracing::info!("Created index {}", index);
        Ok(())
    }

    /// Create every index in turn. A failure is recorded and the remaining
    /// indices are still attempted.
    pub async fn create_partition_indices(
        &self,
        indices: &[IndexName],
    ) -> Vec<(IndexName, Result<(), TransportError>)> {
        let mut outcomes = Vec::with_capacity(indices.len());
        for index in indices {
            let outcome = self.create_index(index).await;
            if let Err(e) = &outcome {
                tracing::warn!("Could not create {}: {}", index, e);
            }
            outcomes.push((index.clone(), outcome));
        }
        outcomes
    }
}
