//! Test fixtures and data generators
//!
//! Generators are seeded so the same call always yields the same data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Random `ACGT` sequence of the given length
pub fn random_sequence(length: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..length).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

/// `count` random k-mers of length `k`
pub fn generate_kmers(count: usize, k: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..k).map(|_| BASES[rng.gen_range(0..4)]).collect())
        .collect()
}

/// Every `ACGT` string of the given width, in lexicographic order
pub fn all_suffixes(width: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    for _ in 0..width {
        out = out
            .into_iter()
            .flat_map(|prefix| BASES.iter().map(move |b| format!("{}{}", prefix, b)))
            .collect();
    }
    out
}

/// The first `n` suffixes of `width`, all observed `count` times
pub fn uniform_corpus(n: usize, width: usize, count: u64) -> Vec<(String, u64)> {
    all_suffixes(width)
        .into_iter()
        .take(n)
        .map(|s| (s, count))
        .collect()
}

/// The first `n` suffixes of `width` with random counts in `1..=max_count`
pub fn skewed_corpus(n: usize, width: usize, max_count: u64, seed: u64) -> Vec<(String, u64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    all_suffixes(width)
        .into_iter()
        .take(n)
        .map(|s| {
            let count = rng.gen_range(1..=max_count);
            (s, count)
        })
        .collect()
}

/// Render records as a `substring<TAB>count` corpus file
pub fn corpus_text(records: &[(String, u64)]) -> String {
    records
        .iter()
        .map(|(s, c)| format!("{}\t{}\n", s, c))
        .collect()
}

/// Assign every suffix of `width` to one of `partitions` names, round robin.
/// Partition names are `P0`, `P1`, ...
pub fn round_robin_assignment(width: usize, partitions: usize) -> Vec<(String, String)> {
    all_suffixes(width)
        .into_iter()
        .enumerate()
        .map(|(i, suffix)| (format!("P{}", i % partitions.max(1)), suffix))
        .collect()
}

/// Render `(partition, member)` pairs as a membership file
pub fn membership_text(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(p, m)| format!("{}\t{}\n", p, m))
        .collect()
}
