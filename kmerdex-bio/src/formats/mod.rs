//! Text formats consumed by the planner and the splitter

pub mod counts;
pub mod jellyfish;

pub use counts::{read_counts, CorpusError, SubstringRecord};
pub use jellyfish::{CountLayout, KmerCount, KmerCountReader};
