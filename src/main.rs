mod cli;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use tfcheck::report::render_outputs;
use tfcheck::{CleanupOutcome, Lifecycle, SystemRunner, Terraform};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tfcheck=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.target.into_config();

    match cli.command {
        Command::Run(args) => {
            let report = Lifecycle::system(config).run().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render_outputs(&report.outputs));
            }
            if let CleanupOutcome::Failed(_) = report.cleanup {
                tracing::warn!("lifecycle passed but destroy failed; run `tfcheck destroy` after investigating");
            }
        }
        Command::Outputs(args) => {
            config.validate()?;
            let terraform = Terraform::new(
                Arc::new(SystemRunner),
                &config,
                Instant::now() + config.timeout,
            );
            let outputs = terraform.verify_outputs(&config.outputs).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                println!("{}", render_outputs(&outputs));
            }
        }
        Command::Destroy => {
            config.validate()?;
            let terraform = Terraform::new(
                Arc::new(SystemRunner),
                &config,
                Instant::now() + config.timeout,
            );
            terraform
                .destroy()
                .await
                .wrap_err("manual destroy failed")?;
            tracing::info!(root = %config.root.display(), "destroy complete");
        }
    }

    Ok(())
}
