//! tfcheck - Terraform lifecycle test harness
//!
//! Drives the `terraform` binary through init, apply, output checks and a
//! guaranteed destroy, reporting every command with its captured output.

pub mod report;
pub mod runner;
pub mod terraform;

mod error;
#[cfg(test)]
mod test_support;

pub use error::{HarnessError, RunError};
pub use report::{CleanupOutcome, LifecycleReport, OutputValue};
pub use runner::{CommandRunner, Invocation, InvocationResult, SystemRunner};
pub use terraform::{Lifecycle, LifecycleConfig, Step, Terraform, extract_output_value};
