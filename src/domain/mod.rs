//! Domain logic - pure release rules independent of git and GitHub I/O

pub mod change_level;
pub mod commit;
pub mod label;
pub mod prerelease;
pub mod pull;
pub mod tag;
pub mod version;

pub use change_level::ChangeLevel;
pub use commit::{annotate_commits, Commit, RawCommit};
pub use label::{LabelClassifier, LabelMeaning, PRERELEASE_LABEL, STABLE_LABEL};
pub use prerelease::PrereleaseSuffix;
pub use pull::{Pull, RawPull};
pub use tag::{TagMatch, TagPrefixes};
