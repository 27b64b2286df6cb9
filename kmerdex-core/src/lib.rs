//! Core utilities and types shared across all kmerdex crates

pub mod config;
pub mod error;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, load_or_default, save_config, Config};
pub use error::{KmerdexError, KmerdexResult};

pub use types::{IndexName, OutputFormat, PartitionName, SampleId};

pub use system::{config_path, kmerdex_home, describe_paths};

/// Version information for the kmerdex project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
