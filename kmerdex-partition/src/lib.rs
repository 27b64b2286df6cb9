//! Partition planning and routing for the k-mer index
//!
//! The planner balances suffix substrings over partitions by observation
//! count and writes a membership table. The router loads that table and maps
//! any k-mer to its partition through the k-mer's fixed-width suffix.

pub mod artifacts;
pub mod planner;
pub mod router;
pub mod split;
pub mod table;

pub use artifacts::{load_info, read_info, write_plan, ArtifactError, PartitionInfo};
pub use planner::{
    MemberStats, Partition, PartitionPlan, PlanError, Planner, PlannerOptions, TrialSummary,
};
pub use router::{RouteError, Router, StrandRoutes, DEFAULT_INDEX_PREFIX};
pub use split::{partition_file, split_counts, SplitError, SplitOptions, SplitStats};
pub use table::{AssignmentTable, TableError};
