mod client;
#[cfg(test)]
mod fake;
mod lifecycle;
mod outputs;

pub use client::Terraform;
pub use lifecycle::Lifecycle;
pub use outputs::extract_output_value;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::HarnessError;

pub const DEFAULT_BINARY: &str = "terraform";
pub const DEFAULT_VAR_FILE: &str = "terratests/test.tfvars";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const BUCKET_OUTPUTS: &[&str] = &["s3_bucket_id", "s3_bucket_arn", "s3_bucket_region"];

/// The terraform subcommands the harness drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Init,
    Apply,
    Output,
    Destroy,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Init => "init",
            Step::Apply => "apply",
            Step::Output => "output",
            Step::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

/// Where and how to run the lifecycle.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub binary: String,
    /// Configuration root; every command runs here.
    pub root: PathBuf,
    /// Relative to `root`.
    pub var_file: PathBuf,
    pub outputs: Vec<String>,
    /// One budget for the whole lifecycle, destroy included.
    pub timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            root: PathBuf::from(".."),
            var_file: PathBuf::from(DEFAULT_VAR_FILE),
            outputs: BUCKET_OUTPUTS.iter().map(|name| name.to_string()).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> Result<(), HarnessError> {
        if !self.root.is_dir() {
            return Err(HarnessError::Config(format!(
                "configuration root '{}' is not a directory",
                self.root.display()
            )));
        }
        if self.binary.trim().is_empty() {
            return Err(HarnessError::Config("terraform binary must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(HarnessError::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}
