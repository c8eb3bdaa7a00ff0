use std::sync::Arc;

use tokio::time::Instant;

use super::{LifecycleConfig, Terraform};
use crate::error::HarnessError;
use crate::report::{CleanupOutcome, LifecycleReport};
use crate::runner::{CommandRunner, SystemRunner};

/// init → apply → output queries → destroy, against one configuration root.
///
/// Once init succeeds, destroy runs exactly once on every exit path: failed
/// apply, failed or empty outputs, panics inside those steps, and the caller
/// dropping the `run` future. A failed destroy is logged and reported but
/// never changes the verdict.
pub struct Lifecycle {
    runner: Arc<dyn CommandRunner>,
    config: LifecycleConfig,
}

impl Lifecycle {
    pub fn new(runner: Arc<dyn CommandRunner>, config: LifecycleConfig) -> Self {
        Self { runner, config }
    }

    pub fn system(config: LifecycleConfig) -> Self {
        Self::new(Arc::new(SystemRunner), config)
    }

    pub async fn run(&self) -> Result<LifecycleReport, HarnessError> {
        self.config.validate()?;

        let deadline = Instant::now() + self.config.timeout;
        let terraform = Terraform::new(Arc::clone(&self.runner), &self.config, deadline);

        terraform.init().await?;
        tracing::info!(root = %self.config.root.display(), "terraform initialized");

        // Destroy is owed from here on. Provisioning and destroy run in a
        // detached task, so dropping this future cannot skip cleanup, and the
        // inner task turns a panic into a JoinError before destroy runs.
        let names = self.config.outputs.clone();
        let settled = tokio::spawn(async move {
            let provisioning = {
                let terraform = terraform.clone();
                tokio::spawn(async move {
                    terraform.apply().await?;
                    tracing::info!("terraform apply complete");
                    terraform.verify_outputs(&names).await
                })
            };
            let verdict = provisioning.await;
            let cleanup = destroy(&terraform).await;
            (verdict, cleanup)
        });

        let (verdict, cleanup) = match settled.await {
            Ok(settled) => settled,
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(join) => return Err(join.into()),
        };

        let outputs = match verdict {
            Ok(result) => result?,
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(join) => return Err(join.into()),
        };

        let report = LifecycleReport { outputs, cleanup };
        if let (Some(bucket), Some(region)) = (
            report.output("s3_bucket_id"),
            report.output("s3_bucket_region"),
        ) {
            tracing::info!(bucket = %bucket, region = %region, "created S3 bucket");
        }

        Ok(report)
    }
}

async fn destroy(terraform: &Terraform) -> CleanupOutcome {
    match terraform.destroy().await {
        Ok(()) => {
            tracing::info!("terraform destroy complete");
            CleanupOutcome::Destroyed
        }
        Err(e) => {
            tracing::warn!(error = %e, "terraform destroy failed, resources may need manual cleanup");
            CleanupOutcome::Failed(e.to_string())
        }
    }
}
