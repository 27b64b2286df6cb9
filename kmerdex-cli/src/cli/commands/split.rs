use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use kmerdex_bio::{CorpusError, CountLayout};
use kmerdex_core::config::Config;
use kmerdex_core::{KmerdexError, OutputFormat, SampleId};
use kmerdex_partition::{split_counts, SplitError, SplitOptions};
use std::path::PathBuf;

#[derive(Args)]
pub struct SplitArgs {
    /// K-mer count dump (`kmer<WS>count` per line), `-` for stdin
    #[arg(value_name = "COUNTS")]
    pub counts: PathBuf,

    /// Directory receiving one `{partition}.txt` per partition
    #[arg(short, long, default_value = "partitions")]
    pub output_dir: PathBuf,

    /// Membership file (defaults to partition.membership_file)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Skip k-mers seen fewer times (defaults to split.min_count)
    #[arg(long)]
    pub min_count: Option<u64>,

    /// Tag every line with this sample id and the k-mer count
    #[arg(long, value_name = "ID")]
    pub sample: Option<SampleId>,

    /// Append to existing partition files
    #[arg(long)]
    pub append: bool,

    /// Input lines are `count<WS>kmer`, as written by `uniq -c`
    #[arg(long)]
    pub count_first: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

pub fn run(args: SplitArgs, config: &Config) -> Result<()> {
    let router = super::load_router(args.table.as_deref(), config)?;
    let options = SplitOptions {
        min_count: args.min_count.unwrap_or(config.split.min_count),
        sample: args.sample,
        sample_id_width: config.kmer.sample_id_width,
        append: args.append,
        layout: if args.count_first {
            CountLayout::CountFirst
        } else {
            CountLayout::KmerFirst
        },
    };

    let reader = super::open_input(&args.counts)?;
    let stats = split_counts(reader, &router, &args.output_dir, &options).map_err(|e| match e {
        SplitError::Io(io) | SplitError::Corpus(CorpusError::Io(io)) => KmerdexError::Io(io),
        SplitError::Route { .. } => KmerdexError::Routing(e.to_string()),
        SplitError::Corpus(other) => KmerdexError::Parse(other.to_string()),
    })?;

    match args.format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Tsv => {
            println!("partition\tkmers");
            for (partition, count) in &stats.per_partition {
                println!("{}\t{}", partition, count);
            }
        }
        OutputFormat::Text => {
            section_header("Split");
            tree_item(false, "Written", &format_number(stats.written));
            tree_item(false, "Skipped (below min count)", &format_number(stats.skipped));
            tree_item(
                true,
                "Partitions with k-mers",
                &stats.per_partition.len().to_string(),
            );
            success(&format!("Partition files in {}", args.output_dir.display()));
        }
    }
    Ok(())
}
