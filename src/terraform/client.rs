use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::Instant;

use super::{LifecycleConfig, Step, extract_output_value};
use crate::error::HarnessError;
use crate::report::OutputValue;
use crate::runner::{CommandRunner, Invocation};

/// Terraform subcommands bound to one configuration root and one deadline.
#[derive(Clone)]
pub struct Terraform {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    root: PathBuf,
    var_file: String,
    deadline: Instant,
}

impl Terraform {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &LifecycleConfig, deadline: Instant) -> Self {
        Self {
            runner,
            binary: config.binary.clone(),
            root: config.root.clone(),
            var_file: config.var_file.display().to_string(),
            deadline,
        }
    }

    pub async fn init(&self) -> Result<(), HarnessError> {
        self.step(Step::Init, &["init", "-input=false"]).await?;
        Ok(())
    }

    pub async fn apply(&self) -> Result<(), HarnessError> {
        let var_file = self.var_file_flag();
        self.step(Step::Apply, &["apply", "-auto-approve", &var_file])
            .await?;
        Ok(())
    }

    /// Queries one output and returns its decoded, non-empty string value.
    pub async fn output(&self, name: &str) -> Result<String, HarnessError> {
        let stdout = self.step(Step::Output, &["output", "-json", name]).await?;
        extract_output_value(name, &stdout)
    }

    /// Queries every name in order, stopping at the first failure.
    pub async fn verify_outputs(&self, names: &[String]) -> Result<Vec<OutputValue>, HarnessError> {
        let mut values = Vec::with_capacity(names.len());
        for name in names {
            let value = self.output(name).await?;
            tracing::debug!(output = %name, value = %value, "output verified");
            values.push(OutputValue {
                name: name.clone(),
                value,
            });
        }
        Ok(values)
    }

    pub async fn destroy(&self) -> Result<(), HarnessError> {
        let var_file = self.var_file_flag();
        self.step(Step::Destroy, &["destroy", "-auto-approve", &var_file])
            .await?;
        Ok(())
    }

    fn var_file_flag(&self) -> String {
        format!("-var-file={}", self.var_file)
    }

    async fn step(&self, step: Step, args: &[&str]) -> Result<String, HarnessError> {
        let invocation = Invocation::new(self.binary.clone(), self.root.clone(), self.deadline)
            .args(args.iter().copied());
        let result = self.runner.run(&invocation).await;

        match result.outcome {
            Ok(()) => Ok(result.stdout),
            Err(source) => Err(HarnessError::Step {
                step,
                command: invocation.command_line(),
                stdout: result.stdout,
                stderr: result.stderr,
                source,
            }),
        }
    }
}
