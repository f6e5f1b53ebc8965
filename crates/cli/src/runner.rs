use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use hostsweep_common::{ScanConfig, Storage};
use hostsweep_orchestrator::ScanOrchestrator;
use hostsweep_prober::HostProber;
use hostsweep_storage::{write_csv, SqliteStore};
use hostsweep_target_parser::parse_targets;

use crate::output::print_batch;

pub struct SweepArgs {
    pub targets: String,
    pub timeout: u64,
    pub workers: usize,
    pub resolve: bool,
    pub tcp_fallback: bool,
    pub fallback_ports: String,
    pub interval: u64,
    pub db: Option<String>,
    pub export_csv: Option<String>,
    pub format: String,
}

pub async fn run_sweep(args: SweepArgs) -> Result<()> {
    // parse errors abort here, before any probing
    let addresses = parse_targets(&args.targets)?;
    let ports = parse_ports(&args.fallback_ports)?;

    let config = ScanConfig::default()
        .with_timeout(Duration::from_millis(args.timeout))
        .with_max_workers(args.workers)
        .with_resolve_names(args.resolve)
        .with_tcp_fallback(args.tcp_fallback)
        .with_fallback_ports(ports);

    info!(
        targets = %args.targets,
        addresses = addresses.len(),
        workers = config.effective_workers(addresses.len()),
        "starting sweep"
    );

    let prober = Arc::new(HostProber::new(config.clone()));
    let orchestrator = ScanOrchestrator::new(prober, config);

    let store = match &args.db {
        Some(path) => Some(
            SqliteStore::open(path)
                .await
                .context("opening scan database")?,
        ),
        None => None,
    };

    if args.interval == 0 {
        return run_round(&orchestrator, store.as_ref(), &addresses, &args).await;
    }

    // recurring mode: one session bracket per round, forever
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    loop {
        ticker.tick().await;
        if let Err(e) = run_round(&orchestrator, store.as_ref(), &addresses, &args).await {
            warn!(error = %e, "sweep round failed");
        }
    }
}

async fn run_round(
    orchestrator: &ScanOrchestrator,
    store: Option<&SqliteStore>,
    addresses: &[Ipv4Addr],
    args: &SweepArgs,
) -> Result<()> {
    let scan_id = match store {
        Some(s) => Some(
            s.begin_scan(Utc::now(), &args.targets, args.interval)
                .await?,
        ),
        None => None,
    };

    let started = Instant::now();
    let batch = orchestrator.scan(addresses).await?;
    let duration = started.elapsed();

    if let (Some(s), Some(id)) = (store, scan_id) {
        s.save_batch(id, &batch).await?;
        s.finish_scan(id, Utc::now()).await?;
    }

    for failure in &batch.failures {
        warn!(addr = %failure.addr, reason = %failure.reason, "probe could not be issued");
    }

    print_batch(&batch, &args.format, duration)?;

    if let Some(path) = &args.export_csv {
        write_csv(path, &batch)?;
        info!(path = %path, rows = batch.results.len(), "batch exported");
    }

    Ok(())
}

/// Parses "445,3389,80" into an ordered fallback port list.
fn parse_ports(ports_str: &str) -> Result<Vec<u16>> {
    let mut ports = Vec::new();

    for part in ports_str.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let port: u16 = part
            .parse()
            .context(format!("Invalid fallback port: {part}"))?;
        ports.push(port);
    }

    if ports.is_empty() {
        Err(anyhow!("No fallback ports specified"))
    } else {
        Ok(ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ports_single() {
        let ports = parse_ports("80").unwrap();
        assert_eq!(ports, vec![80]);
    }

    #[test]
    fn test_parse_ports_keeps_order() {
        let ports = parse_ports("445,3389,80").unwrap();
        assert_eq!(ports, vec![445, 3389, 80]);
    }

    #[test]
    fn test_parse_ports_whitespace() {
        let ports = parse_ports(" 445 , 80 ").unwrap();
        assert_eq!(ports, vec![445, 80]);
    }

    #[test]
    fn test_parse_ports_empty() {
        assert!(parse_ports("").is_err());
        assert!(parse_ports("   ").is_err());
        assert!(parse_ports(",,,").is_err());
    }

    #[test]
    fn test_parse_ports_invalid() {
        assert!(parse_ports("abc").is_err());
        assert!(parse_ports("70000").is_err());
    }
}
