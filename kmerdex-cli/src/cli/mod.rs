pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kmerdex",
    version,
    about = "Balanced k-mer partitioning and partition-routed k-mer lookups",
    long_about = "kmerdex spreads fixed-width k-mer suffixes over a fixed number of partitions \
                  so that every partition carries a similar number of observations, routes \
                  k-mers to their partition, and queries the partition-scoped indices."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (defaults to $KMERDEX_HOME/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(kmerdex_core::config_path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan balanced partitions from a substring count file
    Partition(commands::partition::PartitionArgs),

    /// Show the partition and index of k-mers
    Route(commands::route::RouteArgs),

    /// Split a k-mer count dump into one file per partition
    Split(commands::split::SplitArgs),

    /// Query k-mer documents in the partition indices
    Lookup {
        #[command(subcommand)]
        command: commands::lookup::LookupCommands,
    },

    /// Create the partition indices
    Indices(commands::indices::IndicesArgs),

    /// Show or initialize the configuration
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}
