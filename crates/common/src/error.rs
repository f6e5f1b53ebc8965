//! Error taxonomy for the hostsweep engine.
//!
//! Ordinary unreachability and failed reverse lookups are values, not
//! errors; only conditions that prevent a scan (or a probe) from happening
//! at all appear here.

use std::io;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    /// The target specification is malformed, empty, or logically inverted.
    /// Fatal to the requested scan; raised before any probing begins.
    #[error("invalid target specification '{input}': {reason}")]
    InvalidSpec { input: String, reason: String },

    /// The probe mechanism itself could not be invoked (missing binary,
    /// denied spawn). Distinct from a down host: it indicates a broken
    /// environment and is surfaced alongside the batch, never recorded
    /// as DOWN.
    #[error("probe for {addr} could not be issued: {reason}")]
    ProbeInfrastructure { addr: Ipv4Addr, reason: String },

    /// The worker pool failed mid-batch (a worker panicked or was aborted).
    #[error("worker pool failure: {0}")]
    Pool(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for hostsweep operations
pub type SweepResult<T> = Result<T, SweepError>;
