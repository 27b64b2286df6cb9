//! Substring count corpus: `substring<TAB>count`, one record per line.

use crate::sequence::validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::BufRead;
use thiserror::Error;

/// One distinct substring and how often it was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstringRecord {
    pub substring: String,
    pub count: u64,
}

impl SubstringRecord {
    pub fn new(substring: impl Into<String>, count: u64) -> Self {
        Self {
            substring: substring.into(),
            count,
        }
    }
}

/// Errors raised while reading count files
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason} ('{content}')")]
    Malformed {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("line {line}: substring '{substring}' appears more than once")]
    Duplicate { line: usize, substring: String },
}

impl CorpusError {
    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        CorpusError::Malformed {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read a whole corpus, preserving file order.
///
/// Blank lines are skipped. Substrings must be `ACGT` and share the width of
/// the first record. Any malformed line aborts the read; nothing is returned
/// for a corpus that is only partly valid.
pub fn read_counts<R: BufRead>(reader: R) -> Result<Vec<SubstringRecord>, CorpusError> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut width = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record = parse_line(line_no, trimmed)?;
        let expected = *width.get_or_insert(record.substring.len());
        if record.substring.len() != expected {
            return Err(CorpusError::malformed(
                line_no,
                trimmed,
                format!(
                    "substring width {} differs from {}",
                    record.substring.len(),
                    expected
                ),
            ));
        }
        if !seen.insert(record.substring.clone()) {
            return Err(CorpusError::Duplicate {
                line: line_no,
                substring: record.substring,
            });
        }
        records.push(record);
    }

    tracing::debug!("Read {} substring records", records.len());
    Ok(records)
}

fn parse_line(line_no: usize, line: &str) -> Result<SubstringRecord, CorpusError> {
    let mut fields = line.split('\t');
    let substring = fields.next().unwrap_or_default().trim();
    let count = fields
        .next()
        .ok_or_else(|| CorpusError::malformed(line_no, line, "expected substring<TAB>count"))?
        .trim();
    if fields.next().is_some() {
        return Err(CorpusError::malformed(line_no, line, "too many columns"));
    }
    if substring.is_empty() {
        return Err(CorpusError::malformed(line_no, line, "empty substring"));
    }
    validate(substring).map_err(|e| CorpusError::malformed(line_no, line, e.to_string()))?;
    let count = count
        .parse::<u64>()
        .map_err(|_| CorpusError::malformed(line_no, line, "count is not a non-negative integer"))?;

    Ok(SubstringRecord::new(substring, count))
}
