//! Hostsweep Common - shared types and traits
//!
//! This crate provides the core types, trait seams, and error taxonomy used
//! across the hostsweep sweeper workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{SweepError, SweepResult};
pub use traits::{FallbackCheck, NameResolver, Prober, ReachabilityCheck, Storage};
pub use types::{HostStatus, ProbeFailure, ProbeMethod, ProbeResult, ScanBatch, ScanConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
