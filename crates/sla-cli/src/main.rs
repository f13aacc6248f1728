//! SLA dashboard snapshot tool - Entry Point

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sla_cli::{AppConfig, Application};
use sla_persistence::OutputFormat;
use std::path::PathBuf;
use tracing::info;

/// Check, rebuild and watch SLA dashboard snapshots
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SLA_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a snapshot, validate it and print its summary
    Check {
        /// Snapshot file (defaults to loader.snapshot_path)
        file: Option<PathBuf>,
        /// Fail when the snapshot breaks an invariant
        #[arg(long)]
        strict: bool,
    },
    /// Derive KPIs from order records and write a new snapshot
    Rebuild {
        /// JSON array of orders, or an existing snapshot to take orders from
        #[arg(long)]
        orders: PathBuf,
        /// Output file
        #[arg(long)]
        out: PathBuf,
        /// Output format: js or json (defaults to writer.format)
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Reload a snapshot on an interval, keeping the last good one on failure
    Watch {
        /// Snapshot file (defaults to loader.snapshot_path)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    sla_telemetry::init_logging()?;

    info!("Starting sla-cli v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > SLA_CONFIG env var > config/default.toml
    let (config, config_path) = AppConfig::resolve(args.config)?;
    info!(config_path = ?config_path, "Configuration loaded");

    let app = Application::new(config);

    match args.command {
        Command::Check { file, strict } => {
            let path = app.snapshot_path(file);
            let checked = app.check(&path, strict)?;
            let summary = checked.snapshot.summary();

            println!("Snapshot: {}", path.display());
            println!("  Last update:   {}", summary.last_update);
            println!(
                "  Orders:        {} (done {}, in progress {}, not done {}, open {})",
                summary.total_orders,
                summary.done_orders,
                summary.in_progress_orders,
                summary.not_done_orders,
                summary.open_orders
            );
            println!("  On-time rate:  {}%", summary.on_time_rate);
            println!("  Total amount:  {} SAR", summary.total_amount);
            println!(
                "  Duration:      avg {} / median {} / p90 {} days",
                summary.avg_duration, summary.median_duration, summary.p90_duration
            );
            println!("  Violations:    {}", checked.report.len());
            for violation in checked.report.iter() {
                println!("    - {violation}");
            }
        }
        Command::Rebuild {
            orders,
            out,
            format,
        } => {
            let rebuilt = app.rebuild(&orders, &out, format, Utc::now())?;

            println!(
                "Written {} orders to {} ({}, {} bytes)",
                rebuilt.orders,
                rebuilt.path.display(),
                rebuilt.format.as_str(),
                rebuilt.bytes
            );
            println!("  Total orders:  {}", rebuilt.summary.total_orders);
            println!("  On-time rate:  {}%", rebuilt.summary.on_time_rate);
            println!("  Total amount:  {} SAR", rebuilt.summary.total_amount);
            println!("  Invoices:      {}", rebuilt.payments.total_invoices);
            println!("  Payment rate:  {}%", rebuilt.payments.payment_rate);
        }
        Command::Watch { file } => {
            let path = app.snapshot_path(file);
            let store = app.run_watch(&path).await;
            let status = store.status();
            info!(
                generation = status.generation,
                stale = status.stale,
                last_error = ?status.last_error,
                "Exiting"
            );
        }
    }

    Ok(())
}
