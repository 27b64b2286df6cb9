use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use kmerdex_bio::{read_counts, CorpusError};
use kmerdex_core::config::Config;
use kmerdex_core::{KmerdexError, OutputFormat};
use kmerdex_partition::{
    write_plan, ArtifactError, AssignmentTable, PartitionPlan, PlanError, Planner, PlannerOptions,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct PartitionArgs {
    /// Substring count file (`substring<TAB>count` per line), `-` for stdin
    #[arg(value_name = "COUNTS")]
    pub counts: PathBuf,

    /// Number of partitions (defaults to partition.partitions)
    #[arg(short, long)]
    pub partitions: Option<usize>,

    /// Independent planning trials; the most balanced one is kept
    #[arg(short, long)]
    pub repetitions: Option<usize>,

    /// Base seed, trial i uses seed + i
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory receiving the info and membership files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    info_file: PathBuf,
    membership_file: PathBuf,
    partitions: usize,
    substrings: usize,
    suffix_width: usize,
    total: u64,
    budget: u64,
    spread: u64,
    base_seed: u64,
    winning_trial: usize,
    members: kmerdex_partition::MemberStats,
    trials: &'a [kmerdex_partition::TrialSummary],
}

pub fn run(args: PartitionArgs, config: &Config) -> Result<()> {
    let options = PlannerOptions {
        partitions: args.partitions.unwrap_or(config.partition.partitions),
        repetitions: args.repetitions.unwrap_or(config.partition.repetitions),
        seed: args.seed.or(config.partition.seed),
    };

    let reader = super::open_input(&args.counts)?;
    let corpus = read_counts(reader).map_err(|e| match e {
        CorpusError::Io(io) => KmerdexError::Io(io),
        other => KmerdexError::Parse(format!("{}: {}", args.counts.display(), other)),
    })?;
    tracing::info!(
        "Read {} substrings from {}",
        corpus.len(),
        args.counts.display()
    );

    let planner = Planner::new(options.clone()).map_err(plan_error)?;
    let pb = progress_bar(
        options.repetitions as u64,
        "Planning partitions",
        args.format.is_machine_readable(),
    );
    let plan = planner
        .plan_with_progress(&corpus, |_| pb.inc(1))
        .map_err(plan_error)?;
    pb.finish_and_clear();

    // The membership file must load back as a routing table
    let table = AssignmentTable::from_plan(&plan)
        .map_err(|e| KmerdexError::InvalidInput(e.to_string()))?;
    if table.suffix_len() != config.partition.suffix_length {
        tracing::warn!(
            "Planned suffix width {} differs from partition.suffix_length {}",
            table.suffix_len(),
            config.partition.suffix_length
        );
    }

    let info_file = args.output_dir.join(&config.partition.info_file);
    let membership_file = args.output_dir.join(&config.partition.membership_file);
    write_plan(&plan, &info_file, &membership_file).map_err(|e| match e {
        ArtifactError::Io(io) => KmerdexError::Io(io),
        other => KmerdexError::Other(other.to_string()),
    })?;

    let report = PlanReport {
        info_file,
        membership_file,
        partitions: plan.partitions.len(),
        substrings: plan.substring_count(),
        suffix_width: table.suffix_len(),
        total: plan.total,
        budget: plan.budget,
        spread: plan.spread(),
        base_seed: plan.base_seed,
        winning_trial: plan.winning_trial,
        members: plan.member_stats(),
        trials: &plan.trials,
    };

    match args.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Tsv => {
            println!("partition\tmembers\ttotal");
            for p in sorted_by_total(&plan) {
                println!("{}\t{}\t{}", p.name, p.member_count(), p.total);
            }
            Ok(())
        }
        OutputFormat::Text => {
            print_text(&plan, &report);
            Ok(())
        }
    }
}

fn plan_error(e: PlanError) -> KmerdexError {
    match e {
        PlanError::NoPartitions | PlanError::NoRepetitions => {
            KmerdexError::Configuration(e.to_string())
        }
        other => KmerdexError::InvalidInput(other.to_string()),
    }
}

fn sorted_by_total(plan: &PartitionPlan) -> Vec<&kmerdex_partition::Partition> {
    let mut partitions: Vec<_> = plan.partitions.iter().collect();
    partitions.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    partitions
}

fn print_text(plan: &PartitionPlan, report: &PlanReport<'_>) {
    section_header("Partition Plan");
    tree_item(false, "Substrings", &format_number(report.substrings as u64));
    tree_item(false, "Suffix width", &report.suffix_width.to_string());
    tree_item(false, "Total observations", &format_number(report.total));
    tree_item(false, "Budget per partition", &format_number(report.budget));
    tree_item(
        false,
        "Winning trial",
        &format!("{} of {} (seed {})", report.winning_trial + 1, report.trials.len(), report.base_seed),
    );
    tree_item(true, "Spread (max - min)", &format_number(report.spread));

    section_header("Members per Partition");
    tree_item(false, "Min", &report.members.min.to_string());
    tree_item(false, "Mean", &format!("{:.2}", report.members.mean));
    tree_item(false, "Median", &format!("{:.1}", report.members.median));
    tree_item(true, "Max", &report.members.max.to_string());

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Partition"),
        header_cell("Members"),
        header_cell("Total"),
    ]);
    for p in sorted_by_total(plan) {
        table.add_row(vec![
            p.name.to_string(),
            format_number(p.member_count() as u64),
            format_number(p.total),
        ]);
    }
    println!("\n{}", table);

    success(&format!(
        "Wrote {} and {}",
        report.info_file.display(),
        report.membership_file.display()
    ));
}
