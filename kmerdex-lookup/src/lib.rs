//! Partition-routed k-mer lookups against a document index
//!
//! Every k-mer lives in the index of the partition its suffix routes to.
//! [`LookupService`] routes queries, fans batched lookups out per partition
//! and filters the per-sample counts down to what the caller may see.

pub mod admin;
pub mod document;
pub mod envelope;
pub mod http;
pub mod index;
pub mod memory;
pub mod service;

pub use admin::{IndexAdmin, IndexSettings};
pub use document::{DocumentError, KmerDocument, SampleCount};
pub use envelope::{ErrorEnvelope, ErrorKind};
pub use http::HttpIndex;
pub use index::{DocumentIndex, TransportError};
pub use memory::MemoryIndex;
pub use service::{
    KmerHits, KmerSampleCount, LookupError, LookupService, PartitionFailure, SampleScope,
    SequenceLookup, UnroutableKmer,
};
