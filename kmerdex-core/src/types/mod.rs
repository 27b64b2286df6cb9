/// Core types shared across all kmerdex modules
pub mod format;
pub mod partition;
pub mod sample;

// Re-export commonly used types at module level
pub use format::OutputFormat;
pub use partition::{IndexName, PartitionName};
pub use sample::{SampleId, SampleIdError};
