use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use kmerdex_core::KmerdexError;

fn main() {
    let cli = Cli::parse();

    // KMERDEX_LOG wins over -v
    let log_level = std::env::var("KMERDEX_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = e
            .downcast_ref::<KmerdexError>()
            .map(KmerdexError::exit_code)
            .unwrap_or(1);
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| KmerdexError::Configuration(format!("thread pool: {}", e)))?;

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    let config_path = cli.config_path();
    let load = || kmerdex_core::load_or_default(&config_path);
    match cli.command {
        Commands::Config { command } => cli::commands::config::run(command, &config_path),
        Commands::Partition(args) => cli::commands::partition::run(args, &load()?),
        Commands::Route(args) => cli::commands::route::run(args, &load()?),
        Commands::Split(args) => cli::commands::split::run(args, &load()?),
        Commands::Lookup { command } => cli::commands::lookup::run(command, &load()?),
        Commands::Indices(args) => cli::commands::indices::run(args, &load()?),
    }
}
