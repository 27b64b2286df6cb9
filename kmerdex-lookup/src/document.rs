//! K-mer documents as stored in the partition indices
//!
//! A stored document looks like `{"count": 3, "samples": ["00000005-12", ...]}`.
//! Each packed entry is `{zero-padded sample id}-{count}`; it is parsed into a
//! [`SampleCount`] here and nowhere else.

use kmerdex_core::SampleId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed sample entry '{entry}': {reason}")]
pub struct DocumentError {
    pub entry: String,
    pub reason: &'static str,
}

/// Observation count of a k-mer in one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleCount {
    pub sample_id: SampleId,
    pub count: u64,
}

impl SampleCount {
    /// Parse a packed `00000005-12` entry
    pub fn parse(entry: &str) -> Result<Self, DocumentError> {
        let err = |reason| DocumentError {
            entry: entry.to_string(),
            reason,
        };
        let (id, count) = entry.split_once('-').ok_or_else(|| err("missing '-' separator"))?;
        let sample_id = id.parse::<SampleId>().map_err(|_| err("sample id is not numeric"))?;
        let count = count.parse::<u64>().map_err(|_| err("count is not numeric"))?;
        Ok(Self { sample_id, count })
    }

    /// The packed form stored in documents
    pub fn packed(&self, width: usize) -> String {
        format!("{}-{}", self.sample_id.padded(width), self.count)
    }
}

/// Wire shape of a stored document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawKmerDocument {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub samples: Vec<String>,
}

/// A k-mer document with its sample list decoded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KmerDocument {
    /// Number of samples the k-mer was observed in
    pub count: u64,
    pub samples: Vec<SampleCount>,
}

impl KmerDocument {
    pub fn new(samples: Vec<SampleCount>) -> Self {
        Self {
            count: samples.len() as u64,
            samples,
        }
    }

    /// Samples the predicate admits, in stored order
    pub fn visible_samples<'a, F>(&'a self, mut allows: F) -> impl Iterator<Item = SampleCount> + 'a
    where
        F: FnMut(SampleId) -> bool + 'a,
    {
        self.samples
            .iter()
            .copied()
            .filter(move |s| allows(s.sample_id))
    }
}

impl TryFrom<RawKmerDocument> for KmerDocument {
    type Error = DocumentError;

    fn try_from(raw: RawKmerDocument) -> Result<Self, Self::Error> {
        let samples = raw
            .samples
            .iter()
            .map(|entry| SampleCount::parse(entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            count: raw.count,
            samples,
        })
    }
}

/// Response of a point get
#[derive(Debug, Deserialize)]
pub(crate) struct GetResponse {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<RawKmerDocument>,
}

/// Response of a multi-get
#[derive(Debug, Deserialize)]
pub(crate) struct MultiGetResponse {
    #[serde(default)]
    pub docs: Vec<GetResponse>,
}
