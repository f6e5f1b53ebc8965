mod args;
mod output;
mod runner;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use args::{Cli, Commands};
use runner::{run_sweep, SweepArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sweep {
            targets,
            timeout,
            workers,
            resolve,
            tcp_fallback,
            fallback_ports,
            interval,
            db,
            export_csv,
            format,
        } => {
            run_sweep(SweepArgs {
                targets,
                timeout,
                workers,
                resolve,
                tcp_fallback,
                fallback_ports,
                interval,
                db,
                export_csv,
                format,
            })
            .await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).compact().init();
}
