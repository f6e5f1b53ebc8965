//! CSV rendering of a scan batch.

use hostsweep_common::{ScanBatch, SweepResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "ip,status,rtt_ms,hostname,timestamp,method";

/// Write the batch to `path` as delimited text: a fixed header line, then
/// one row per result in batch order. Absent RTTs and hostnames render as
/// empty cells.
pub fn write_csv(path: impl AsRef<Path>, batch: &ScanBatch) -> SweepResult<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{HEADER}")?;
    for result in &batch.results {
        let rtt = result
            .rtt_millis()
            .map(|v| format!("{v:.1}"))
            .unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{},{}",
            result.addr,
            result.status,
            rtt,
            result.hostname.as_deref().unwrap_or(""),
            result.timestamp.to_rfc3339(),
            result.method,
        )?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hostsweep_common::{ProbeResult, ScanConfig};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    #[test]
    fn renders_header_and_rows() {
        let ts = Utc::now();
        let mut batch = ScanBatch::new(ScanConfig::default(), ts);
        batch.results.push(
            ProbeResult::up(Ipv4Addr::new(10, 0, 0, 1), Duration::from_millis(4), ts)
                .with_hostname("nas.lan".to_string()),
        );
        batch
            .results
            .push(ProbeResult::down(Ipv4Addr::new(10, 0, 0, 2), ts));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        write_csv(&path, &batch).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("10.0.0.1,UP,4.0,nas.lan,"));
        assert!(lines[1].ends_with(",primary"));
        // absent rtt and hostname are empty cells
        assert!(lines[2].starts_with("10.0.0.2,DOWN,,,"));
    }

    #[test]
    fn empty_batch_is_just_the_header() {
        let batch = ScanBatch::new(ScanConfig::default(), Utc::now());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, &batch).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), HEADER);
    }
}
