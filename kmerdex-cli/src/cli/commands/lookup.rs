use crate::cli::output::*;
use anyhow::Result;
use clap::{Args, Subcommand};
use kmerdex_core::config::Config;
use kmerdex_core::{KmerdexError, OutputFormat, PartitionName, SampleId};
use kmerdex_lookup::{
    ErrorEnvelope, HttpIndex, KmerSampleCount, LookupError, LookupService, SampleScope,
};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum LookupCommands {
    /// Look up a single k-mer
    Kmer(KmerArgs),

    /// Look up many k-mers in one partition with a single request
    Batch(BatchArgs),

    /// Look up every k-mer of a sequence and of its reverse complement
    Sequence(SequenceArgs),
}

/// Samples the results are restricted to
#[derive(Args)]
pub struct ScopeArgs {
    /// Visible sample ids (comma separated)
    #[arg(short, long, value_delimiter = ',', value_name = "IDS")]
    pub samples: Vec<SampleId>,

    /// Return every sample (administrator access)
    #[arg(long)]
    pub all_samples: bool,
}

impl ScopeArgs {
    fn scope(&self) -> SampleScope {
        SampleScope::new(self.samples.iter().copied()).with_privilege(self.all_samples)
    }
}

#[derive(Args)]
pub struct TargetArgs {
    /// Membership file (defaults to partition.membership_file)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Index URL (defaults to index.url)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct KmerArgs {
    pub kmer: String,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Partition the k-mers were routed to
    #[arg(value_name = "PARTITION")]
    pub partition: String,

    #[arg(value_name = "KMER")]
    pub kmers: Vec<String>,

    /// Read k-mers from a file, one per line (`-` for stdin)
    #[arg(long, value_name = "PATH", conflicts_with = "kmers")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct SequenceArgs {
    pub sequence: String,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn run(command: LookupCommands, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        LookupCommands::Kmer(args) => runtime.block_on(kmer(args, config)),
        LookupCommands::Batch(args) => runtime.block_on(batch(args, config)),
        LookupCommands::Sequence(args) => runtime.block_on(sequence(args, config)),
    }
}

fn service(target: &TargetArgs, config: &Config) -> Result<LookupService<HttpIndex>> {
    let router = super::load_router(target.table.as_deref(), config)?;
    let mut index_config = config.index.clone();
    if let Some(url) = &target.url {
        index_config.url = url.clone();
    }
    let index = HttpIndex::new(&index_config)
        .map_err(|e| KmerdexError::Configuration(e.to_string()))?;
    Ok(LookupService::from_config(router, index, config))
}

/// Report a rejected lookup. Machine-readable output gets the error envelope.
fn failure(err: LookupError, format: OutputFormat) -> anyhow::Error {
    if format == OutputFormat::Json {
        if let Ok(json) = serde_json::to_string_pretty(&ErrorEnvelope::from(&err)) {
            println!("{}", json);
        }
    }
    let message = err.to_string();
    match err {
        LookupError::MissingSampleScope | LookupError::InvalidSequence(_) => {
            KmerdexError::InvalidInput(message)
        }
        LookupError::Unroutable(_) => KmerdexError::Routing(message),
        LookupError::Transport { .. } => KmerdexError::Network(message),
    }
    .into()
}

fn print_rows(rows: &[KmerSampleCount], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Tsv => {
            println!("kmer\tsample_id\tcount");
            for row in rows {
                println!("{}\t{}\t{}", row.kmer, row.sample_id, row.count);
            }
            Ok(())
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                empty("No visible samples contain these k-mers");
                return Ok(());
            }
            let mut table = create_standard_table();
            table.set_header(vec![
                header_cell("K-mer"),
                header_cell("Sample"),
                header_cell("Count"),
            ]);
            for row in rows {
                table.add_row(vec![
                    row.kmer.clone(),
                    row.sample_id.to_string(),
                    format_number(row.count),
                ]);
            }
            println!("{}", table);
            Ok(())
        }
    }
}

async fn kmer(args: KmerArgs, config: &Config) -> Result<()> {
    let format = args.target.format;
    let service = service(&args.target, config)?;
    let hits = service
        .lookup_single(&args.kmer, &args.scope.scope())
        .await
        .map_err(|e| failure(e, format))?;

    if format == OutputFormat::Text {
        section_header(&format!("{} ({})", hits.kmer, hits.partition));
        if !hits.found {
            empty("K-mer not found");
            return Ok(());
        }
    }
    let rows: Vec<KmerSampleCount> = hits
        .results
        .iter()
        .map(|s| KmerSampleCount {
            kmer: hits.kmer.clone(),
            sample_id: s.sample_id,
            count: s.count,
        })
        .collect();
    match format {
        OutputFormat::Json => print_json(&hits),
        _ => print_rows(&rows, format),
    }
}

async fn batch(args: BatchArgs, config: &Config) -> Result<()> {
    let format = args.target.format;
    let kmers = match &args.file {
        Some(path) => super::read_lines(path)?,
        None => args.kmers.clone(),
    };
    let service = service(&args.target, config)?;
    let partition = PartitionName::new(args.partition);
    let rows = service
        .lookup_batch(&partition, &kmers, &args.scope.scope())
        .await
        .map_err(|e| failure(e, format))?;
    print_rows(&rows, format)
}

async fn sequence(args: SequenceArgs, config: &Config) -> Result<()> {
    let format = args.target.format;
    let service = service(&args.target, config)?;
    let lookup = service
        .lookup_sequence(&args.sequence, &args.scope.scope())
        .await
        .map_err(|e| failure(e, format))?;

    match format {
        OutputFormat::Json => print_json(&lookup)?,
        OutputFormat::Tsv => print_rows(&lookup.results, format)?,
        OutputFormat::Text => {
            section_header("Sequence Lookup");
            tree_item(false, "K-mers", &format_number(lookup.kmers_considered as u64));
            tree_item(
                true,
                "Partitions answered",
                &format!("{} of {}", lookup.partitions_answered(), lookup.partitions_queried),
            );
            println!();
            print_rows(&lookup.results, format)?;
            for failed in &lookup.failed_partitions {
                warning(&format!(
                    "{} ({} k-mers) did not answer: {}",
                    failed.partition, failed.kmers, failed.message
                ));
            }
            if !lookup.unroutable.is_empty() {
                warning(&format!(
                    "{} k-mers could not be routed",
                    lookup.unroutable.len()
                ));
            }
        }
    }

    if lookup.is_partial() {
        tracing::warn!(
            "Partial result: {} of {} partitions answered, {} unroutable",
            lookup.partitions_answered(),
            lookup.partitions_queried,
            lookup.unroutable.len()
        );
    }
    Ok(())
}
