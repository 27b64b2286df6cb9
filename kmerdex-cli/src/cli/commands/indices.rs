use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use kmerdex_core::config::Config;
use kmerdex_core::{IndexName, KmerdexError, OutputFormat};
use kmerdex_lookup::{IndexAdmin, IndexSettings};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct IndicesArgs {
    /// Membership file (defaults to partition.membership_file)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Index URL (defaults to index.url)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Print the indices and creation body without contacting the index
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct IndexOutcome {
    index: IndexName,
    created: bool,
    error: Option<String>,
}

pub fn run(args: IndicesArgs, config: &Config) -> Result<()> {
    let router = super::load_router(args.table.as_deref(), config)?;
    let indices: Vec<IndexName> = router
        .table()
        .partitions()
        .iter()
        .map(|p| router.index_name(p))
        .collect();

    let mut index_config = config.index.clone();
    if let Some(url) = &args.url {
        index_config.url = url.clone();
    }

    if args.dry_run {
        let settings = IndexSettings::from(&index_config);
        return match args.format {
            OutputFormat::Json => print_json(&serde_json::json!({
                "indices": indices,
                "body": settings.body(),
            })),
            _ => {
                for index in &indices {
                    println!("PUT {}/{}", index_config.url.trim_end_matches('/'), index);
                }
                println!("{}", serde_json::to_string_pretty(&settings.body())?);
                Ok(())
            }
        };
    }

    let admin = IndexAdmin::new(&index_config)
        .map_err(|e| KmerdexError::Configuration(e.to_string()))?;
    let runtime = tokio::runtime::Runtime::new()?;
    let outcomes: Vec<IndexOutcome> = runtime
        .block_on(admin.create_partition_indices(&indices))
        .into_iter()
        .map(|(index, outcome)| IndexOutcome {
            index,
            created: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        })
        .collect();
    let failed = outcomes.iter().filter(|o| !o.created).count();

    match args.format {
        OutputFormat::Json => print_json(&outcomes)?,
        OutputFormat::Tsv => {
            println!("index\tcreated\terror");
            for o in &outcomes {
                println!("{}\t{}\t{}", o.index, o.created, o.error.as_deref().unwrap_or(""));
            }
        }
        OutputFormat::Text => {
            let mut table = create_standard_table();
            table.set_header(vec![header_cell("Index"), header_cell("Status")]);
            for o in &outcomes {
                table.add_row(vec![
                    o.index.to_string(),
                    o.error.clone().unwrap_or_else(|| "created".to_string()),
                ]);
            }
            println!("{}", table);
            if failed == 0 {
                success(&format!("Created {} indices", outcomes.len()));
            }
        }
    }

    if failed > 0 {
        return Err(KmerdexError::Network(format!(
            "{} of {} indices could not be created",
            failed,
            outcomes.len()
        ))
        .into());
    }
    Ok(())
}
