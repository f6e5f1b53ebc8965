use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hostsweep")]
#[command(version)]
#[command(about = "Concurrent LAN reachability sweeper", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every address in a target specification
    Sweep {
        /// Targets: single address, inclusive range, or CIDR.
        /// Examples: 192.168.1.55 or 192.168.1.10-192.168.1.50 or 192.168.1.0/24
        #[arg(short = 't', long, required = true)]
        targets: String,

        /// Per-probe timeout in milliseconds
        #[arg(long, default_value = "800")]
        timeout: u64,

        /// Max concurrent probe workers
        #[arg(short, long, default_value = "64")]
        workers: usize,

        /// Reverse-resolve hostnames for reachable hosts
        #[arg(long)]
        resolve: bool,

        /// Try TCP connects when the echo probe fails (firewalled hosts)
        #[arg(long)]
        tcp_fallback: bool,

        /// Ports tried by the TCP fallback, in order
        #[arg(long, default_value = "445,3389,80")]
        fallback_ports: String,

        /// Re-sweep every N seconds (0 = single sweep)
        #[arg(short, long, default_value = "0")]
        interval: u64,

        /// SQLite database to append scan sessions to
        #[arg(long)]
        db: Option<String>,

        /// Write each finished batch to this CSV file
        #[arg(long)]
        export_csv: Option<String>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}
