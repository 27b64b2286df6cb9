pub mod paths;

// Re-export commonly used functions
pub use paths::{config_path, describe_paths, is_custom_home, kmerdex_home};
