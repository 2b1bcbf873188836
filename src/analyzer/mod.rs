//! Analysis engine: from commit ranges to a version decision

pub mod aggregator;
pub mod check;
pub mod next;
pub mod resolver;

pub use aggregator::CommitAggregator;
pub use check::{check_pull, PullCheck};
pub use next::{next, NextRequest, NextResult};
pub use resolver::{Resolver, VersionChange};
