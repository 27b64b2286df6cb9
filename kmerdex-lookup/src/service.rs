//! Routed, scope-filtered k-mer lookups
//!
//! All three operations reject an unprivileged caller without visible samples
//! before touching the network. A sequence lookup fans out one multi-get per
//! partition; a partition that cannot be queried is reported in
//! [`SequenceLookup::failed_partitions`] while the others still answer.

use crate::document::SampleCount;
use crate::index::{DocumentIndex, TransportError};
use futures::stream::{self, StreamExt};
use indexmap::{IndexMap, IndexSet};
use kmerdex_bio::{kmers, reverse_complement, validate, SequenceError};
use kmerdex_core::config::Config;
use kmerdex_core::{IndexName, PartitionName, SampleId};
use kmerdex_partition::{RouteError, Router};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_KMER_LENGTH: usize = 31;
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("kmer requests must include samples to query")]
    MissingSampleScope,

    #[error("invalid sequence: {0}")]
    InvalidSequence(#[from] SequenceError),

    #[error("{0}")]
    Unroutable(#[from] RouteError),

    #[error("partition {partition}: {source}")]
    Transport {
        partition: PartitionName,
        #[source]
        source: TransportError,
    },
}

/// Samples a caller is allowed to see
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleScope {
    visible: BTreeSet<SampleId>,
    privileged: bool,
}

impl SampleScope {
    pub fn new<I: IntoIterator<Item = SampleId>>(visible: I) -> Self {
        Self {
            visible: visible.into_iter().collect(),
            privileged: false,
        }
    }

    /// Administrator scope: every sample is visible
    pub fn privileged() -> Self {
        Self {
            visible: BTreeSet::new(),
            privileged: true,
        }
    }

    pub fn with_privilege(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn visible(&self) -> &BTreeSet<SampleId> {
        &self.visible
    }

    pub fn allows(&self, sample: SampleId) -> bool {
        self.privileged || self.visible.contains(&sample)
    }

    fn ensure_present(&self) -> Result<(), LookupError> {
        if !self.privileged && self.visible.is_empty() {
            return Err(LookupError::MissingSampleScope);
        }
        Ok(())
    }
}

/// Result of a single k-mer lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KmerHits {
    pub kmer: String,
    pub partition: PartitionName,
    /// Whether the index holds a document for the k-mer at all
    pub found: bool,
    /// Number of visible samples
    pub count: usize,
    pub results: Vec<SampleCount>,
}

/// One (kmer, sample, count) row of a batched lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KmerSampleCount {
    pub kmer: String,
    pub sample_id: SampleId,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnroutableKmer {
    pub kmer: String,
    pub suffix: String,
}

/// A partition whose batched query failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionFailure {
    pub partition: PartitionName,
    pub index: IndexName,
    /// Distinct k-mers that went unanswered
    pub kmers: usize,
    pub message: String,
    #[serde(skip)]
    pub error: TransportError,
}

/// Merged result of a sequence lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceLookup {
    /// Forward k-mers in the sequence
    pub kmers_considered: usize,
    /// Forward plus reverse-complement strings, before deduplication
    pub strings_considered: usize,
    pub partitions_queried: usize,
    pub results: Vec<KmerSampleCount>,
    pub unroutable: Vec<UnroutableKmer>,
    pub failed_partitions: Vec<PartitionFailure>,
}

impl SequenceLookup {
    fn empty() -> Self {
        Self {
            kmers_considered: 0,
            strings_considered: 0,
            partitions_queried: 0,
            results: Vec::new(),
            unroutable: Vec::new(),
            failed_partitions: Vec::new(),
        }
    }

    pub fn partitions_answered(&self) -> usize {
        self.partitions_queried - self.failed_partitions.len()
    }

    /// Some strings could not be routed or some partitions did not answer
    pub fn is_partial(&self) -> bool {
        !self.failed_partitions.is_empty() || !self.unroutable.is_empty()
    }
}

pub struct LookupService<I> {
    router: Arc<Router>,
    index: I,
    kmer_length: usize,
    concurrency: usize,
}

impl<I: DocumentIndex> LookupService<I> {
    pub fn new(router: Arc<Router>, index: I) -> Self {
        Self {
            router,
            index,
            kmer_length: DEFAULT_KMER_LENGTH,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn from_config(router: Arc<Router>, index: I, config: &Config) -> Self {
        Self::new(router, index)
            .with_kmer_length(config.kmer.length)
            .with_concurrency(config.index.concurrency)
    }

    pub fn with_kmer_length(mut self, k: usize) -> Self {
        self.kmer_length = k;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn kmer_length(&self) -> usize {
        self.kmer_length
    }

    /// Look up one k-mer in its routed partition.
    /// A k-mer absent from the index is an empty result, not an error.
    pub async fn lookup_single(
        &self,
        kmer: &str,
        scope: &SampleScope,
    ) -> Result<KmerHits, LookupError> {
        scope.ensure_present()?;
        let kmer = kmer.trim().to_ascii_uppercase();
        validate(&kmer)?;

        let partition = self.router.route(&kmer)?.clone();
        let index = self.router.index_name(&partition);
        let document = self
            .index
            .get(&index, &kmer)
            .await
            .map_err(|source| LookupError::Transport {
                partition: partition.clone(),
                source,
            })?;

        let results: Vec<SampleCount> = document
            .as_ref()
            .map(|doc| doc.visible_samples(|id| scope.allows(id)).collect())
            .unwrap_or_default();
        tracing::debug!(
            "{} -> {}: {} visible samples",
            kmer,
            index,
            results.len()
        );

        Ok(KmerHits {
            kmer,
            partition,
            found: document.is_some(),
            count: results.len(),
            results,
        })
    }

    /// One multi-get against an already routed partition
    pub async fn lookup_batch<K, S>(
        &self,
        partition: &PartitionName,
        kmers: K,
        scope: &SampleScope,
    ) -> Result<Vec<KmerSampleCount>, LookupError>
    where
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        scope.ensure_present()?;
        let ids: IndexSet<String> = kmers
            .into_iter()
            .map(|k| k.as_ref().trim().to_ascii_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = ids.into_iter().collect();
        self.fetch_partition(partition, &ids, scope)
            .await
            .map_err(|source| LookupError::Transport {
                partition: partition.clone(),
                source,
            })
    }

    /// Decompose `sequence` into k-mers, add reverse complements and query
    /// every routed partition once.
    pub async fn lookup_sequence(
        &self,
        sequence: &str,
        scope: &SampleScope,
    ) -> Result<SequenceLookup, LookupError> {
        scope.ensure_present()?;
        let sequence = sequence.trim().to_ascii_uppercase();
        validate(&sequence)?;

        let windows = kmers(&sequence, self.kmer_length);
        if windows.len() == 0 {
            return Ok(SequenceLookup::empty());
        }

        let mut groups: BTreeMap<PartitionName, IndexSet<String>> = BTreeMap::new();
        let mut unroutable: IndexMap<String, String> = IndexMap::new();
        let mut kmers_considered = 0;
        for kmer in windows {
            kmers_considered += 1;
            let rc = reverse_complement(kmer)?;
            for candidate in [kmer.to_string(), rc] {
                match self.router.route(&candidate) {
                    Ok(partition) => {
                        groups.entry(partition.clone()).or_default().insert(candidate);
                    }
                    Err(RouteError::Unroutable { suffix }) => {
                        unroutable.entry(candidate).or_insert(suffix);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let partitions_queried = groups.len();
        tracing::debug!(
            "{} kmers (+ reverse complements) over {} partitions",
            kmers_considered,
            partitions_queried
        );

        let outcomes: Vec<_> = stream::iter(groups)
            .map(|(partition, ids)| async move {
                let ids: Vec<String> = ids.into_iter().collect();
                let outcome = self.fetch_partition(&partition, &ids, scope).await;
                (partition, ids.len(), outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut lookup = SequenceLookup {
            kmers_considered,
            strings_considered: kmers_considered * 2,
            partitions_queried,
            ..SequenceLookup::empty()
        };
        for (partition, kmers, outcome) in outcomes {
            match outcome {
                Ok(mut hits) => lookup.results.append(&mut hits),
                Err(error) => {
                    tracing::warn!("Partition {} did not answer: {}", partition, error);
                    lookup.failed_partitions.push(PartitionFailure {
                        index: self.router.index_name(&partition),
                        partition,
                        kmers,
                        message: error.to_string(),
                        error,
                    });
                }
            }
        }
        lookup.unroutable = unroutable
            .into_iter()
            .map(|(kmer, suffix)| UnroutableKmer { kmer, suffix })
            .collect();

        if !lookup.unroutable.is_empty() {
            tracing::warn!("{} strings could not be routed", lookup.unroutable.len());
        }
        tracing::info!(
            "{} of {} partitions answered, {} hits",
            lookup.partitions_answered(),
            lookup.partitions_queried,
            lookup.results.len()
        );
        Ok(lookup)
    }

    async fn fetch_partition(
        &self,
        partition: &PartitionName,
        ids: &[String],
        scope: &SampleScope,
    ) -> Result<Vec<KmerSampleCount>, TransportError> {
        let index = self.router.index_name(partition);
        let documents = self.index.multi_get(&index, ids).await?;

        let mut hits = Vec::new();
        for (kmer, document) in &documents {
            for sample in document.visible_samples(|id| scope.allows(id)) {
                hits.push(KmerSampleCount {
                    kmer: kmer.clone(),
                    sample_id: sample.sample_id,
                    count: sample.count,
                });
            }
        }
        Ok(hits)
    }
}
