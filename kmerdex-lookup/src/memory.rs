//! In-process document index
//!
//! Serves documents from memory and counts requests. Indices can be marked
//! unavailable to simulate a partition that cannot be reached.

use crate::document::KmerDocument;
use crate::index::{DocumentIndex, TransportError};
use async_trait::async_trait;
use kmerdex_core::IndexName;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: RwLock<HashMap<IndexName, HashMap<String, KmerDocument>>>,
    unavailable: RwLock<HashSet<IndexName>>,
    requests: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, index: IndexName, id: impl Into<String>, document: KmerDocument) {
        self.documents
            .write()
            .entry(index)
            .or_default()
            .insert(id.into(), document);
    }

    /// Fail every request against `index` from now on
    pub fn make_unavailable(&self, index: IndexName) {
        self.unavailable.write().insert(index);
    }

    /// Requests served so far, failed ones included
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn check(&self, index: &IndexName) -> Result<(), TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.read().contains(index) {
            return Err(TransportError::Timeout {
                url: format!("memory://{}", index),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn get(
        &self,
        index: &IndexName,
        id: &str,
    ) -> Result<Option<KmerDocument>, TransportError> {
        self.check(index)?;
        Ok(self
            .documents
            .read()
            .get(index)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn multi_get(
        &self,
        index: &IndexName,
        ids: &[String],
    ) -> Result<Vec<(String, KmerDocument)>, TransportError> {
        self.check(index)?;
        let documents = self.documents.read();
        let Some(docs) = documents.get(index) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| docs.get(id).map(|doc| (id.clone(), doc.clone())))
            .collect())
    }
}
