//! Persistence for sweep sessions: SQLite append-only storage plus a CSV
//! file export of a finished batch.

mod export;
mod sqlite;

pub use export::write_csv;
pub use sqlite::{SqliteStore, StoredResult};
