//! Matrix test runner
//!
//! Runs one test command against a sequence of release environments, in
//! release order, recording one result line per version.
//!
//! # Modules
//!
//! - [`selection`]: start / exact version filters
//! - [`command`]: script preparation and executable rewriting
//! - [`executor`]: running the per-version shell script
//! - [`report`]: result log and summary table
//! - [`runner`]: `MatrixRunner`, tying the cache and executor together
//! - [`error`]: error types for matrix runs

pub mod command;
pub mod error;
pub mod executor;
pub mod report;
pub mod runner;
pub mod selection;

pub use executor::{CommandExecutor, Invocation, ShellExecutor};
pub use report::{ResultLog, Summary, TestRun};
pub use runner::{MatrixRunner, RunRequest, RunnerOptions};
pub use selection::Selection;
