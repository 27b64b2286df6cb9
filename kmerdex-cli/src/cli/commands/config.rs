use crate::cli::output::*;
use anyhow::Result;
use clap::Subcommand;
use kmerdex_core::{describe_paths, load_or_default, save_config, Config, KmerdexError, OutputFormat};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: ConfigCommands, path: &Path) -> Result<()> {
    match command {
        ConfigCommands::Show { format } => {
            let config = load_or_default(path)?;
            match format {
                OutputFormat::Json => print_json(&config)?,
                _ => {
                    if format == OutputFormat::Text {
                        info(&format!("Configuration from {}", path.display()));
                        println!("{}\n", describe_paths());
                    }
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| KmerdexError::Serialization(e.to_string()))?;
                    print!("{}", rendered);
                }
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(KmerdexError::Configuration(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ))
                .into());
            }
            save_config(path, &Config::default())?;
            success(&format!("Wrote default configuration to {}", path.display()));
            Ok(())
        }
    }
}
