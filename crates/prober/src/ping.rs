//! Primary reachability check backed by the system ping utility.

use async_trait::async_trait;
use hostsweep_common::{ReachabilityCheck, SweepError, SweepResult};
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::trace;

/// Shells out to the platform ping binary, one echo request per call.
///
/// The child is hard-bounded by the caller-supplied timeout rather than the
/// utility's own flag: the flag's shape and unit differ between platform
/// families (and between distros), while the outer bound does not.
pub struct SystemPing;

impl SystemPing {
    pub fn new() -> Self {
        Self
    }

    fn command(addr: Ipv4Addr, timeout: Duration) -> Command {
        let mut cmd = Command::new("ping");
        if cfg!(windows) {
            // -n 1: one echo, -w: reply wait in ms, -4: force IPv4
            cmd.args(["-n", "1", "-w"]);
            cmd.arg(timeout.as_millis().to_string());
            cmd.arg("-4");
        } else {
            // -c 1: one echo, -n: numeric output; no -W, the outer timeout
            // cuts the process instead
            cmd.args(["-c", "1", "-n"]);
        }
        cmd.arg(addr.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReachabilityCheck for SystemPing {
    async fn check(&self, addr: Ipv4Addr, timeout: Duration) -> SweepResult<Option<Duration>> {
        let mut cmd = Self::command(addr, timeout);
        let started = Instant::now();

        let status = match tokio::time::timeout(timeout, cmd.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                // the probe never went out: missing binary, denied spawn --
                // an environment problem, not a down host
                return Err(SweepError::ProbeInfrastructure {
                    addr,
                    reason: format!("failed to invoke ping: {e}"),
                });
            }
            Err(_) => {
                trace!(%addr, "echo probe timed out");
                return Ok(None);
            }
        };

        if status.success() {
            Ok(Some(started.elapsed()))
        } else {
            trace!(%addr, code = ?status.code(), "echo probe got no reply");
            Ok(None)
        }
    }
}
