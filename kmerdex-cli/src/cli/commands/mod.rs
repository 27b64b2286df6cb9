pub mod config;
pub mod indices;
pub mod lookup;
pub mod partition;
pub mod route;
pub mod split;

use kmerdex_core::config::Config;
use kmerdex_core::KmerdexError;
use kmerdex_partition::{AssignmentTable, Router, TableError};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load the membership table (`--table` or `partition.membership_file`) into a router
pub(crate) fn load_router(table: Option<&Path>, config: &Config) -> anyhow::Result<Arc<Router>> {
    let path = table
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.partition.membership_file));

    let table = AssignmentTable::load(&path).map_err(|e| match e {
        TableError::Io(io) => KmerdexError::Io(io),
        other => KmerdexError::Parse(format!("{}: {}", path.display(), other)),
    })?;

    if table.suffix_len() != config.partition.suffix_length {
        tracing::warn!(
            "{} uses {}-base suffixes, config expects {}",
            path.display(),
            table.suffix_len(),
            config.partition.suffix_length
        );
    }

    Ok(Arc::new(
        Router::new(table).with_index_prefix(&config.index.index_prefix),
    ))
}

/// Buffered reader over `path`, or stdin for `-`
pub(crate) fn open_input(path: &Path) -> Result<Box<dyn BufRead>, KmerdexError> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|e| {
        KmerdexError::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    Ok(Box::new(BufReader::new(file)))
}

/// Non-empty trimmed lines of `path`
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>, KmerdexError> {
    let mut lines = Vec::new();
    for line in open_input(path)?.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}
