use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use kmerdex_bio::reverse_complement;
use kmerdex_core::config::Config;
use kmerdex_core::{IndexName, KmerdexError, OutputFormat, PartitionName};
use kmerdex_partition::Router;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct RouteArgs {
    /// K-mers to route
    #[arg(value_name = "KMER")]
    pub kmers: Vec<String>,

    /// Read k-mers from a file, one per line (`-` for stdin)
    #[arg(long, value_name = "PATH", conflicts_with = "kmers")]
    pub file: Option<PathBuf>,

    /// Membership file (defaults to partition.membership_file)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Also route each reverse complement
    #[arg(long)]
    pub both: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct RouteRow {
    kmer: String,
    strand: &'static str,
    partition: Option<PartitionName>,
    index: Option<IndexName>,
    error: Option<String>,
}

fn route_row(router: &Router, kmer: String, strand: &'static str) -> RouteRow {
    match router.route(&kmer) {
        Ok(partition) => RouteRow {
            index: Some(router.index_name(partition)),
            partition: Some(partition.clone()),
            kmer,
            strand,
            error: None,
        },
        Err(e) => RouteRow {
            kmer,
            strand,
            partition: None,
            index: None,
            error: Some(e.to_string()),
        },
    }
}

pub fn run(args: RouteArgs, config: &Config) -> Result<()> {
    let router = super::load_router(args.table.as_deref(), config)?;
    let kmers = match &args.file {
        Some(path) => super::read_lines(path)?,
        None => args.kmers.clone(),
    };
    if kmers.is_empty() {
        return Err(KmerdexError::InvalidInput("no k-mers given".to_string()).into());
    }

    let mut rows = Vec::with_capacity(kmers.len() * if args.both { 2 } else { 1 });
    for kmer in kmers {
        let kmer = kmer.to_ascii_uppercase();
        if args.both {
            match reverse_complement(&kmer) {
                Ok(rc) => {
                    rows.push(route_row(&router, kmer, "forward"));
                    rows.push(route_row(&router, rc, "reverse"));
                }
                Err(e) => rows.push(RouteRow {
                    kmer,
                    strand: "forward",
                    partition: None,
                    index: None,
                    error: Some(e.to_string()),
                }),
            }
        } else {
            rows.push(route_row(&router, kmer, "forward"));
        }
    }

    let failures = rows.iter().filter(|r| r.error.is_some()).count();
    match args.format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Tsv => {
            println!("kmer\tstrand\tpartition\tindex");
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    row.kmer,
                    row.strand,
                    row.partition.as_ref().map(|p| p.as_str()).unwrap_or("-"),
                    row.index.as_ref().map(|i| i.as_str()).unwrap_or("-"),
                );
            }
        }
        OutputFormat::Text => {
            let mut table = create_standard_table();
            table.set_header(vec![
                header_cell("K-mer"),
                header_cell("Strand"),
                header_cell("Partition"),
                header_cell("Index"),
            ]);
            for row in &rows {
                table.add_row(vec![
                    row.kmer.clone(),
                    row.strand.to_string(),
                    row.partition
                        .as_ref()
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| row.error.clone().unwrap_or_default()),
                    row.index.as_ref().map(|i| i.to_string()).unwrap_or_default(),
                ]);
            }
            println!("{}", table);
            if failures > 0 {
                warning(&format!("{} of {} could not be routed", failures, rows.len()));
            }
        }
    }

    if failures > 0 {
        return Err(KmerdexError::Routing(format!(
            "{} of {} k-mers could not be routed",
            failures,
            rows.len()
        ))
        .into());
    }
    Ok(())
}
