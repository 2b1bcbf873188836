pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod hooks;
pub mod ui;

pub use error::{ReleaseError, Result};
