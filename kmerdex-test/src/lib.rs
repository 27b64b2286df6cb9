//! Test utilities for the kmerdex workspace
//!
//! Fixtures produce plain data (strings, counts, file contents) so that any
//! crate in the workspace can use them without a dependency cycle.

pub mod environment;
pub mod fixtures;

pub use environment::TestEnvironment;
pub use fixtures::{
    all_suffixes, corpus_text, generate_kmers, membership_text, random_sequence,
    round_robin_assignment, skewed_corpus, uniform_corpus,
};

pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (safe to call from every test)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .try_init();
}

/// Run a test with an isolated scratch directory
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    f(&env)
}
