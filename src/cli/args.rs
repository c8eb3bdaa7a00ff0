use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tfcheck::LifecycleConfig;
use tfcheck::terraform::{BUCKET_OUTPUTS, DEFAULT_BINARY, DEFAULT_VAR_FILE};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// init, apply, verify outputs, then always destroy
    Run(ReportArgs),
    /// Verify outputs of an already-applied configuration
    Outputs(ReportArgs),
    /// Destroy what the configuration manages, for manual remediation
    Destroy,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Terraform configuration root
    #[arg(long, global = true, env = "TFCHECK_DIR", default_value = ".")]
    pub dir: PathBuf,

    #[arg(long, global = true, env = "TFCHECK_TERRAFORM", default_value = DEFAULT_BINARY)]
    pub terraform: String,

    /// Relative to --dir
    #[arg(long, global = true, env = "TFCHECK_VAR_FILE", default_value = DEFAULT_VAR_FILE)]
    pub var_file: PathBuf,

    #[arg(
        long = "output",
        global = true,
        value_name = "NAME",
        default_values = BUCKET_OUTPUTS.iter().copied()
    )]
    pub outputs: Vec<String>,

    #[arg(long, global = true, env = "TFCHECK_TIMEOUT_MINUTES", default_value_t = 30)]
    pub timeout_minutes: u64,
}

impl TargetArgs {
    pub fn into_config(self) -> LifecycleConfig {
        LifecycleConfig {
            binary: self.terraform,
            root: self.dir,
            var_file: self.var_file,
            outputs: self.outputs,
            timeout: Duration::from_secs(self.timeout_minutes.saturating_mul(60)),
        }
    }
}
