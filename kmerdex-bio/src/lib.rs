//! Nucleotide utilities and count-file formats for kmerdex
//!
//! - Alphabet checks and reverse complements over {A,C,G,T}
//! - Sliding-window k-mer decomposition and suffix routing keys
//! - Parsers for substring count corpora and k-mer count dumps

pub mod formats;
pub mod sequence;

pub use formats::{
    read_counts, CorpusError, CountLayout, KmerCount, KmerCountReader, SubstringRecord,
};
pub use sequence::{
    complement, is_nucleotide, kmers, reverse_complement, suffix_key, validate, KmerWindows,
    SequenceError,
};
