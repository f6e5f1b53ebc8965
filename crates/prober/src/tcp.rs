//! Connection-oriented fallback check.

use async_trait::async_trait;
use hostsweep_common::FallbackCheck;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Floor applied to the per-port connect timeout.
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_millis(50);

/// Detects hosts whose echo replies are filtered by attempting plain TCP
/// connects against a short list of commonly open ports. Stops at the first
/// port that accepts.
pub struct TcpConnectFallback;

impl TcpConnectFallback {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TcpConnectFallback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FallbackCheck for TcpConnectFallback {
    async fn check(&self, addr: Ipv4Addr, ports: &[u16], connect_timeout: Duration) -> bool {
        let bound = connect_timeout.max(MIN_CONNECT_TIMEOUT);
        for &port in ports {
            let sock = SocketAddr::from((addr, port));
            match timeout(bound, TcpStream::connect(sock)).await {
                Ok(Ok(_stream)) => {
                    trace!(%addr, port, "fallback connect accepted");
                    return true;
                }
                // refused, unreachable, or out of time: try the next port
                Ok(Err(_)) | Err(_) => continue,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn finds_a_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let up = TcpConnectFallback::new()
            .check(Ipv4Addr::LOCALHOST, &[port], Duration::from_millis(500))
            .await;
        assert!(up);
    }

    #[tokio::test]
    async fn keeps_trying_ports_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();

        // a port that was just released is almost certainly closed
        let closed_port = {
            let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
            probe.local_addr().unwrap().port()
        };

        let up = TcpConnectFallback::new()
            .check(
                Ipv4Addr::LOCALHOST,
                &[closed_port, open_port],
                Duration::from_millis(500),
            )
            .await;
        assert!(up);
    }

    #[tokio::test]
    async fn reports_down_when_no_port_accepts() {
        let closed_port = {
            let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
            probe.local_addr().unwrap().port()
        };

        let up = TcpConnectFallback::new()
            .check(Ipv4Addr::LOCALHOST, &[closed_port], Duration::from_millis(200))
            .await;
        assert!(!up);
    }

    #[tokio::test]
    async fn empty_port_list_is_down() {
        let up = TcpConnectFallback::new()
            .check(Ipv4Addr::LOCALHOST, &[], Duration::from_millis(100))
            .await;
        assert!(!up);
    }
}
