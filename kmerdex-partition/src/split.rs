//! Split a k-mer count dump into one file per partition

use crate::router::{RouteError, Router};
use kmerdex_bio::{CorpusError, CountLayout, KmerCountReader};
use kmerdex_core::{PartitionName, SampleId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("line {line}: {source}")]
    Route {
        line: usize,
        #[source]
        source: RouteError,
    },
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Records below this count are skipped (2 skips singletons)
    pub min_count: u64,
    /// Tag each line with `{padded sample}-{count}`
    pub sample: Option<SampleId>,
    pub sample_id_width: usize,
    /// Append to existing partition files instead of truncating them
    pub append: bool,
    pub layout: CountLayout,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            min_count: 2,
            sample: None,
            sample_id_width: 8,
            append: false,
            layout: CountLayout::KmerFirst,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitStats {
    pub written: u64,
    pub skipped: u64,
    pub per_partition: BTreeMap<PartitionName, u64>,
}

/// Path of the output file for `partition` under `dir`
pub fn partition_file(dir: &Path, partition: &PartitionName) -> PathBuf {
    dir.join(format!("{}.txt", partition))
}

/// Route every k-mer of `reader` and append it to its partition's file.
///
/// One file is opened per partition of the router's table up front, so
/// partitions without k-mers still get an (empty) file.
pub fn split_counts<R: BufRead>(
    reader: R,
    router: &Router,
    out_dir: &Path,
    options: &SplitOptions,
) -> Result<SplitStats, SplitError> {
    std::fs::create_dir_all(out_dir)?;

    let mut writers: HashMap<PartitionName, BufWriter<File>> = HashMap::new();
    for partition in router.table().partitions() {
        let path = partition_file(out_dir, &partition);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(options.append)
            .truncate(!options.append)
            .open(&path)?;
        writers.insert(partition, BufWriter::new(file));
    }

    let mut stats = SplitStats::default();
    let mut records = KmerCountReader::with_layout(reader, options.layout);
    while let Some(record) = records.next() {
        let record = record?;
        if record.count < options.min_count {
            stats.skipped += 1;
            continue;
        }

        let partition = router.route(&record.kmer).map_err(|source| SplitError::Route {
            line: records.line_no(),
            source,
        })?;
        // Every routed partition comes from the same table the writers were opened from
        let Some(writer) = writers.get_mut(partition) else {
            continue;
        };
        match options.sample {
            Some(sample) => writeln!(
                writer,
                "{}\t{}-{}",
                record.kmer,
                sample.padded(options.sample_id_width),
                record.count
            )?,
            None => writeln!(writer, "{}", record.kmer)?,
        }

        stats.written += 1;
        *stats.per_partition.entry(partition.clone()).or_default() += 1;
        if stats.written % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Written {} kmers, skipped {} below min count...",
                stats.written,
                stats.skipped
            );
        }
    }

    for writer in writers.values_mut() {
        writer.flush()?;
    }

    tracing::info!(
        "Written {} kmers, skipped {} below min count",
        stats.written,
        stats.skipped
    );
    Ok(stats)
}
