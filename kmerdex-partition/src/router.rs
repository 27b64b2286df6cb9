//! Suffix-based routing of k-mers to partitions

use crate::table::AssignmentTable;
use kmerdex_bio::{reverse_complement, suffix_key, SequenceError};
use kmerdex_core::{IndexName, PartitionName};
use thiserror::Error;

/// Default prefix of partition index names
pub const DEFAULT_INDEX_PREFIX: &str = "kmer";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The suffix is missing from the assignment table: a coverage gap, not an empty result
    #[error("suffix '{suffix}' is not assigned to a partition")]
    Unroutable { suffix: String },

    #[error("fragment of length {len} is shorter than the {window}-base routing window")]
    FragmentTooShort { len: usize, window: usize },

    #[error("cannot reverse complement: {0}")]
    InvalidSequence(#[from] SequenceError),
}

/// Partitions of a k-mer and of its reverse complement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrandRoutes {
    pub forward: (String, PartitionName),
    pub reverse: (String, PartitionName),
}

impl StrandRoutes {
    pub fn same_partition(&self) -> bool {
        self.forward.1 == self.reverse.1
    }
}

/// Stateless router over an injected assignment table
#[derive(Debug, Clone)]
pub struct Router {
    table: AssignmentTable,
    index_prefix: String,
}

impl Router {
    pub fn new(table: AssignmentTable) -> Self {
        Self {
            table,
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
        }
    }

    pub fn with_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }

    pub fn suffix_len(&self) -> usize {
        self.table.suffix_len()
    }

    /// Partition of `fragment`, keyed by its last `suffix_len` characters
    pub fn route(&self, fragment: &str) -> Result<&PartitionName, RouteError> {
        let window = self.table.suffix_len();
        let suffix = suffix_key(fragment, window).ok_or(RouteError::FragmentTooShort {
            len: fragment.len(),
            window,
        })?;
        self.table.get(suffix).ok_or_else(|| RouteError::Unroutable {
            suffix: suffix.to_string(),
        })
    }

    /// Index holding `fragment`'s documents
    pub fn index_for(&self, fragment: &str) -> Result<IndexName, RouteError> {
        self.route(fragment).map(|p| self.index_name(p))
    }

    pub fn index_name(&self, partition: &PartitionName) -> IndexName {
        partition.index_name(&self.index_prefix)
    }

    /// Route a k-mer and its reverse complement independently
    pub fn route_both(&self, kmer: &str) -> Result<StrandRoutes, RouteError> {
        let rc = reverse_complement(kmer)?;
        let forward = self.route(kmer)?.clone();
        let reverse = self.route(&rc)?.clone();
        Ok(StrandRoutes {
            forward: (kmer.to_string(), forward),
            reverse: (rc, reverse),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        let pairs = kmerdex_test::round_robin_assignment(7, 4);
        Router::new(AssignmentTable::from_pairs(pairs).unwrap())
    }

    #[test]
    fn test_route_uses_last_seven_bases() {
        let table = AssignmentTable::from_pairs(vec![("PX", "ACGTACG"), ("PY", "CGTACGT")]).unwrap();
        let router = Router::new(table);
        let partition = router.route("ACGTACGTACGTACGTACGTACGTACGTACG").unwrap();
        assert_eq!(partition.as_str(), "PX");
    }

    #[test]
    fn test_route_is_deterministic() {
        let router = router();
        for kmer in kmerdex_test::generate_kmers(50, 31, 7) {
            let first = router.route(&kmer).unwrap().clone();
            for _ in 0..3 {
                assert_eq!(router.route(&kmer).unwrap(), &first);
            }
        }
    }

    #[test]
    fn test_unroutable_suffix() {
        let table = AssignmentTable::from_pairs(vec![("P1", "AAAAAAA")]).unwrap();
        let router = Router::new(table);
        assert_eq!(
            router.route("CCCCCCCCCC").unwrap_err(),
            RouteError::Unroutable { suffix: "CCCCCCC".to_string() }
        );
    }

    #[test]
    fn test_fragment_too_short() {
        assert_eq!(
            router().route("ACG").unwrap_err(),
            RouteError::FragmentTooShort { len: 3, window: 7 }
        );
    }

    #[test]
    fn test_index_name() {
        let table = AssignmentTable::from_pairs(vec![("GATTACA", "AAAAAAA")]).unwrap();
        let router = Router::new(table).with_index_prefix("kmer");
        assert_eq!(router.index_for("TTAAAAAAA").unwrap().as_str(), "kmer_gattaca");
    }

    #[test]
    fn test_route_both_strands() {
        let table = AssignmentTable::from_pairs(vec![("FWD", "AAAAAAA"), ("REV", "TTTTTTT")]).unwrap();
        let router = Router::new(table);
        let routes = router.route_both("AAAAAAAAAAAAAAA").unwrap();
        assert_eq!(routes.forward.1.as_str(), "FWD");
        assert_eq!(routes.reverse.0, "TTTTTTTTTTTTTTT");
        assert_eq!(routes.reverse.1.as_str(), "REV");
        assert!(!routes.same_partition());
    }

    #[test]
    fn test_route_both_rejects_ambiguous_bases() {
        assert!(matches!(
            router().route_both("ACGTNACGTACG"),
            Err(RouteError::InvalidSequence(_))
        ));
    }
}
