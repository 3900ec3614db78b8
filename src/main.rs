use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aws_migration_exporter::config::MigrationConfig;
use aws_migration_exporter::pipeline::run_migration;

/// Export an AWS data source into a batched CSV dataset.
#[derive(Parser)]
#[command(name = "aws-migration-exporter", version)]
struct Cli {
    /// Path to the migration config JSON file.
    config: PathBuf,

    /// Root directory the project output is created under.
    #[arg(long, default_value = "migrations")]
    output_root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = MigrationConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let report = run_migration(&config, &cli.output_root)
        .await
        .context("migration export failed")?;

    println!("Migration export complete");
    println!("  project dir:   {}", report.project_dir.display());
    println!("  total records: {}", report.total_records);
    println!(
        "  batches:       {}/{} written",
        report.batches_succeeded, report.batches_attempted
    );
    println!("  stats file:    {}", report.stats_csv_path.display());

    Ok(())
}
