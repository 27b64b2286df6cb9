//! Planner output files
//!
//! - info file: `partition<TAB>member_count<TAB>total_count`
//! - membership file: `partition<TAB>substring`
//!
//! Both are sorted by partition name; members are sorted within a partition.

use crate::planner::PartitionPlan;
use kmerdex_core::PartitionName;
use serde::Serialize;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected partition<TAB>members<TAB>total ('{content}')")]
    Malformed { line: usize, content: String },
}

/// One line of the info file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionInfo {
    pub name: PartitionName,
    pub member_count: usize,
    pub total: u64,
}

/// Write both artifacts. Contents go to temporary files next to the targets
/// and are only moved into place once both are fully written.
///
/// The membership file is moved first. If moving the info file then fails,
/// the new membership file stays next to the previous info file.
pub fn write_plan(
    plan: &PartitionPlan,
    info_path: &Path,
    membership_path: &Path,
) -> Result<(), ArtifactError> {
    let mut partitions: Vec<_> = plan.partitions.iter().collect();
    partitions.sort_by(|a, b| a.name.cmp(&b.name));

    let mut info = temp_beside(info_path)?;
    {
        let mut w = BufWriter::new(info.as_file_mut());
        for p in &partitions {
            writeln!(w, "{}\t{}\t{}", p.name, p.member_count(), p.total)?;
        }
        w.flush()?;
    }

    let mut membership = temp_beside(membership_path)?;
    {
        let mut w = BufWriter::new(membership.as_file_mut());
        for p in &partitions {
            let mut members: Vec<&String> = p.members.iter().collect();
            members.sort();
            for member in members {
                writeln!(w, "{}\t{}", p.name, member)?;
            }
        }
        w.flush()?;
    }

    membership.persist(membership_path).map_err(|e| e.error)?;
    info.persist(info_path).map_err(|e| e.error)?;

    tracing::info!(
        "Wrote {} partitions to {} and {}",
        partitions.len(),
        info_path.display(),
        membership_path.display()
    );
    Ok(())
}

fn temp_beside(path: &Path) -> std::io::Result<NamedTempFile> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)?;
            NamedTempFile::new_in(dir)
        }
        _ => NamedTempFile::new_in("."),
    }
}

/// Read an info file. Totals written with thousands separators are accepted.
pub fn read_info<R: BufRead>(reader: R) -> Result<Vec<PartitionInfo>, ArtifactError> {
    let mut infos = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let malformed = || ArtifactError::Malformed {
            line: idx + 1,
            content: trimmed.to_string(),
        };
        let fields: Vec<&str> = trimmed.split('\t').collect();
        if fields.len() != 3 || fields[0].is_empty() {
            return Err(malformed());
        }
        let member_count = fields[1].replace(',', "").parse().map_err(|_| malformed())?;
        let total = fields[2].replace(',', "").parse().map_err(|_| malformed())?;
        infos.push(PartitionInfo {
            name: PartitionName::new(fields[0]),
            member_count,
            total,
        });
    }
    Ok(infos)
}

pub fn load_info<P: AsRef<Path>>(path: P) -> Result<Vec<PartitionInfo>, ArtifactError> {
    let file = std::fs::File::open(path)?;
    read_info(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{Planner, PlannerOptions};
    use crate::table::AssignmentTable;
    use kmerdex_bio::SubstringRecord;
    use kmerdex_test::TestEnvironment;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn example_plan() -> PartitionPlan {
        let corpus = vec![
            SubstringRecord::new("AAAAAAA", 100),
            SubstringRecord::new("GGGGGGG", 50),
            SubstringRecord::new("CCCCCCC", 50),
        ];
        Planner::new(PlannerOptions { partitions: 3, repetitions: 1, seed: Some(1) })
            .unwrap()
            .plan(&corpus)
            .unwrap()
    }

    #[test]
    fn test_write_plan_files() {
        let env = TestEnvironment::new().unwrap();
        let info = env.root().join("out/partition.info");
        let membership = env.root().join("out/partition.txt");

        write_plan(&example_plan(), &info, &membership).unwrap();

        assert_eq!(
            env.read_file("out/partition.info").unwrap(),
            "AAAAAAA\t1\t100\nCCCCCCC\t1\t50\nGGGGGGG\t1\t50\n"
        );
        assert_eq!(
            env.read_file("out/partition.txt").unwrap(),
            "AAAAAAA\tAAAAAAA\nCCCCCCC\tCCCCCCC\nGGGGGGG\tGGGGGGG\n"
        );

        // Only the two artifacts remain in the directory
        let entries = std::fs::read_dir(env.root().join("out")).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_membership_file_loads_as_table() {
        let env = TestEnvironment::new().unwrap();
        let info = env.root().join("partition.info");
        let membership = env.root().join("partition.txt");
        let plan = example_plan();
        write_plan(&plan, &info, &membership).unwrap();

        let table = AssignmentTable::load(&membership).unwrap();
        let built = AssignmentTable::from_plan(&plan).unwrap();
        assert_eq!(table.len(), plan.substring_count());
        assert_eq!(built.len(), table.len());
        assert_eq!(built.suffix_len(), table.suffix_len());
        for (substring, partition) in plan.assignments() {
            assert_eq!(table.get(substring), Some(partition));
            assert_eq!(built.get(substring), Some(partition));
        }

        let infos = load_info(&info).unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].total, 100);
    }

    #[test]
    fn test_failed_membership_write_leaves_no_info() {
        let env = TestEnvironment::new().unwrap();
        let info = env.root().join("partition.info");
        let membership = env.root().join("partition.txt");
        // A non-empty directory in the way makes the rename fail
        env.write_file("partition.txt/keep", "").unwrap();

        assert!(write_plan(&example_plan(), &info, &membership).is_err());
        assert!(!info.exists());
        assert!(membership.is_dir());
    }

    #[test]
    fn test_read_info_accepts_separators() {
        let infos = read_info(Cursor::new("P1\t12\t1,234,567\n")).unwrap();
        assert_eq!(infos[0].member_count, 12);
        assert_eq!(infos[0].total, 1_234_567);
    }

    #[test]
    fn test_read_info_malformed() {
        let err = read_info(Cursor::new("P1\t12\n")).unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed { line: 1, .. }));
    }
}
