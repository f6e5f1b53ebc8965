//! Host probing - the per-address reachability sequence.
//!
//! `HostProber` wires the default checks together: a system-ping primary
//! probe, a TCP connect fallback, and a best-effort reverse resolver. Each
//! piece sits behind a trait so platforms with better facilities (raw
//! sockets, a local mDNS cache) can swap theirs in.

mod dns;
mod ping;
mod prober;
mod tcp;

pub use dns::DnsReverse;
pub use ping::SystemPing;
pub use prober::HostProber;
pub use tcp::TcpConnectFallback;
