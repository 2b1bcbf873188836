//! Hook scripts for extensibility
//!
//! Allows users to run custom scripts at key workflow points:
//! - pre-tag: Before the release tag is created; failure aborts the release
//! - post-tag: After the tag is created and pushed
//! - post-release: After the GitHub release is published

pub mod executor;
pub mod lifecycle;

pub use executor::HookExecutor;
pub use lifecycle::{HookContext, HookType};
