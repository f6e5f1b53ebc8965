//! Scan orchestration - bounded fan-out over independent probe tasks.

mod orchestrator;
mod progress;

pub use orchestrator::ScanOrchestrator;
pub use progress::ProgressTracker;
