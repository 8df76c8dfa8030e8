//! sls-sweep: discover and clean up orphaned Serverless-framework resources
//!
//! `discover` scans the account and writes a timestamped JSON report;
//! `cleanup` takes that report plus explicit resource ids and deletes
//! exactly those.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sls_sweep::aws::{get_current_account_id, AwsContext};
use sls_sweep::cleanup::{AwsDeleter, Cleaner, CleanupOutcome, OutcomeStatus};
use sls_sweep::discover::Discoverer;
use sls_sweep::report::OrphanReport;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sls-sweep")]
#[command(about = "Find and remove orphaned Serverless-framework AWS resources")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the account for orphan candidates and write a JSON report
    Discover {
        /// AWS region (defaults to the ambient AWS configuration)
        #[arg(long)]
        region: Option<String>,

        /// AWS profile to use (overrides AWS_PROFILE)
        #[arg(long)]
        aws_profile: Option<String>,

        /// Directory the report is written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Delete resources listed in a previously generated report
    Cleanup {
        /// Path to the discovery report JSON file
        report: PathBuf,

        /// Identifiers of the resources to delete, exactly as they appear
        /// in the report
        #[arg(required = true)]
        resource_ids: Vec<String>,

        /// AWS region (defaults to the ambient AWS configuration)
        #[arg(long)]
        region: Option<String>,

        /// AWS profile to use (overrides AWS_PROFILE)
        #[arg(long)]
        aws_profile: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Discover {
            region,
            aws_profile,
            output_dir,
        } => {
            let ctx = AwsContext::new(region.as_deref(), aws_profile.as_deref()).await;
            let account = get_current_account_id(&ctx)
                .await
                .context("Unable to verify AWS credentials")?;

            info!(
                account = %account,
                region = %ctx.region(),
                "Starting orphan resource discovery"
            );

            let discoverer = Discoverer::from_context(&ctx);
            let path = discoverer.run(&output_dir).await?;

            println!("\nDiscovery complete! Report saved to: {}", path.display());
        }

        Command::Cleanup {
            report,
            resource_ids,
            region,
            aws_profile,
        } => {
            // Load before touching AWS: an unreadable report is fatal and
            // nothing should be attempted.
            let report = OrphanReport::load(&report)?;

            let ctx = AwsContext::new(region.as_deref(), aws_profile.as_deref()).await;
            let account = get_current_account_id(&ctx)
                .await
                .context("Unable to verify AWS credentials")?;

            info!(
                account = %account,
                region = %ctx.region(),
                targets = resource_ids.len(),
                "Starting resource cleanup"
            );

            let cleaner = Cleaner::new(AwsDeleter::from_context(&ctx));
            let outcomes = cleaner.run(&report, &resource_ids).await;

            print_outcomes(&outcomes);
        }
    }

    Ok(())
}

/// One status line per processed target, then summary counts.
///
/// Per-resource failures are reported here but do not change the exit code;
/// partial success is an expected outcome of a cleanup run.
fn print_outcomes(outcomes: &[CleanupOutcome]) {
    println!("\nCleanup results");
    println!("{}", "-".repeat(40));

    for outcome in outcomes {
        let kind = outcome.kind.map(|k| k.as_str()).unwrap_or("-");
        match outcome.status {
            OutcomeStatus::Deleted => {
                println!("deleted            {kind}: {}", outcome.resource_id);
            }
            OutcomeStatus::SkippedNotFound => {
                println!(
                    "skipped-not-found  {}: not present in report",
                    outcome.resource_id
                );
            }
            OutcomeStatus::Failed => {
                println!(
                    "failed             {kind}: {} ({})",
                    outcome.resource_id,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    let deleted = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Deleted)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Failed)
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::SkippedNotFound)
        .count();

    println!("\n{deleted} deleted, {failed} failed, {skipped} skipped");
}
