//! Partition assignment table: suffix substring -> partition name

use crate::planner::PartitionPlan;
use kmerdex_core::PartitionName;
use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected partition<TAB>substring ('{content}')")]
    Malformed { line: usize, content: String },

    #[error("substring '{substring}' is assigned to both {first} and {second}")]
    DuplicateAssignment {
        substring: String,
        first: PartitionName,
        second: PartitionName,
    },

    #[error("substring '{substring}' has width {found}, expected {expected}")]
    InconsistentWidth {
        substring: String,
        expected: usize,
        found: usize,
    },

    #[error("assignment table is empty")]
    Empty,
}

/// Static mapping from fixed-width suffix to partition.
///
/// Loaded once and injected into the router; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AssignmentTable {
    suffix_len: usize,
    assignments: HashMap<String, PartitionName>,
}

impl AssignmentTable {
    /// Build a table from `(partition, substring)` pairs.
    /// Every substring must have the same width and appear once.
    pub fn from_pairs<I, P, S>(pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PartitionName>,
        S: Into<String>,
    {
        let mut assignments: HashMap<String, PartitionName> = HashMap::new();
        let mut suffix_len = None;

        for (partition, substring) in pairs {
            let partition = partition.into();
            let substring = substring.into();

            let expected = *suffix_len.get_or_insert(substring.len());
            if substring.len() != expected {
                return Err(TableError::InconsistentWidth {
                    found: substring.len(),
                    substring,
                    expected,
                });
            }

            if let Some(first) = assignments.get(&substring) {
                return Err(TableError::DuplicateAssignment {
                    substring,
                    first: first.clone(),
                    second: partition,
                });
            }
            assignments.insert(substring, partition);
        }

        let suffix_len = suffix_len.ok_or(TableError::Empty)?;
        Ok(Self {
            suffix_len,
            assignments,
        })
    }

    /// Build the table straight from a finished plan
    pub fn from_plan(plan: &PartitionPlan) -> Result<Self, TableError> {
        Self::from_pairs(
            plan.assignments()
                .map(|(substring, partition)| (partition.clone(), substring.to_string())),
        )
    }

    /// Read a membership file (`partition<TAB>substring` per line)
    pub fn read<R: BufRead>(reader: R) -> Result<Self, TableError> {
        let mut pairs = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut fields = trimmed.split('\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(partition), Some(substring), None)
                    if !partition.is_empty() && !substring.is_empty() =>
                {
                    pairs.push((PartitionName::new(partition), substring.to_string()));
                }
                _ => {
                    return Err(TableError::Malformed {
                        line: idx + 1,
                        content: trimmed.to_string(),
                    })
                }
            }
        }
        Self::from_pairs(pairs)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::read(std::io::BufReader::new(file))?;
        tracing::debug!(
            "Loaded {} suffix assignments over {} partitions from {}",
            table.len(),
            table.partitions().len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    pub fn get(&self, suffix: &str) -> Option<&PartitionName> {
        self.assignments.get(suffix)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Distinct partition names, sorted
    pub fn partitions(&self) -> Vec<PartitionName> {
        self.assignments
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
