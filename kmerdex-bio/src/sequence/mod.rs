//! Nucleotide sequence operations

pub mod kmers;
pub mod nucleotide;

pub use kmers::{kmers, suffix_key, KmerWindows};
pub use nucleotide::{complement, is_nucleotide, reverse_complement, validate, SequenceError};
