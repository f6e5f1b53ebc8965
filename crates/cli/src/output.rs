//! Output formatting for sweep batches.

use anyhow::Result;
use hostsweep_common::{ProbeResult, ScanBatch};
use std::time::Duration;

/// Print a batch in the requested format.
pub fn print_batch(batch: &ScanBatch, format: &str, sweep_duration: Duration) -> Result<()> {
    let format = format.trim().to_lowercase();
    match format.as_str() {
        "json" | "j" => print_json(batch, sweep_duration)?,
        "csv" | "c" => print_csv(batch),
        "table" | "text" | "t" | "" => print_table(batch, sweep_duration),
        _ => {
            eprintln!("Warning: Unknown format '{format}', using default table format");
            print_table(batch, sweep_duration);
        }
    }
    Ok(())
}

/// ASCII table of reachable hosts (ascending by address) plus a summary.
fn print_table(batch: &ScanBatch, sweep_duration: Duration) {
    if batch.results.is_empty() && batch.failures.is_empty() {
        println!("\nNo results to display.\n");
        return;
    }

    let mut up_rows: Vec<&ProbeResult> =
        batch.results.iter().filter(|r| r.status.is_up()).collect();
    up_rows.sort_by_key(|r| r.addr);

    println!("\n{:-<72}", "");
    println!(
        "{:<18} {:<8} {:<12} {:<24} {:<8}",
        "ADDRESS", "STATUS", "RTT", "HOSTNAME", "METHOD"
    );
    println!("{:-<72}", "");

    for result in &up_rows {
        println!(
            "{:<18} {:<8} {:<12} {:<24} {:<8}",
            result.addr.to_string(),
            result.status.as_str(),
            format_rtt(result.rtt_millis()),
            result.hostname.as_deref().unwrap_or("-"),
            result.method.as_str(),
        );
    }

    println!("{:-<72}", "");
    println!("\nSummary:");
    println!("  Swept: {}", batch.results.len());
    println!("  Up: {}", batch.up_count());
    println!("  Down: {}", batch.down_count());
    if !batch.failures.is_empty() {
        println!("  Not probed (environment failure): {}", batch.failures.len());
    }
    println!("  Duration: {}", format_duration(sweep_duration));
    println!();
}

/// JSON document with sweep metadata, results, and failures.
fn print_json(batch: &ScanBatch, sweep_duration: Duration) -> Result<()> {
    use serde_json::json;

    let output = json!({
        "sweep_info": {
            "batch_id": batch.id,
            "started_at": batch.started_at.to_rfc3339(),
            "duration_seconds": sweep_duration.as_secs_f64(),
            "swept": batch.results.len(),
            "up": batch.up_count(),
            "down": batch.down_count(),
        },
        "results": batch.results,
        "failures": batch.failures,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// CSV on stdout, same shape as the file export.
fn print_csv(batch: &ScanBatch) {
    println!("ip,status,rtt_ms,hostname,timestamp,method");
    for result in &batch.results {
        println!(
            "{},{},{},{},{},{}",
            result.addr,
            result.status,
            result
                .rtt_millis()
                .map(|v| format!("{v:.1}"))
                .unwrap_or_default(),
            result.hostname.as_deref().unwrap_or(""),
            result.timestamp.to_rfc3339(),
            result.method,
        );
    }
}

fn format_rtt(rtt_ms: Option<f64>) -> String {
    match rtt_ms {
        Some(v) => format!("{v:.1} ms"),
        None => "-".to_string(),
    }
}

/// Format duration in a human-readable way
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{millis}ms")
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{total_secs}.{millis:03}s")
        } else {
            format!("{total_secs}s")
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{mins}m {secs}s")
        } else {
            format!("{mins}m")
        }
    }
}
