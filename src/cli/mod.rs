//! Command-line workflow layer

pub mod orchestration;

pub use orchestration::{publish_release, run_release_workflow, ReleaseWorkflowArgs, WorkflowResult};
