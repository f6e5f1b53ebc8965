//! Append-only SQLite store for scan sessions and result rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostsweep_common::{ScanBatch, Storage, SweepError, SweepResult};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Row;
use std::path::Path;
use tracing::debug;

fn storage_err(e: sqlx::Error) -> SweepError {
    SweepError::Storage(e.to_string())
}

/// Epoch seconds with sub-second precision, the on-disk timestamp form.
fn epoch_seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp_micros() as f64 / 1_000_000.0
}

/// One `scans` row per sweep session (opened before the sweep, closed
/// after), bulk `scan_results` rows per batch. Rows are never updated
/// except for closing the session bracket.
pub struct SqliteStore {
    pool: SqlitePool,
}

/// A persisted result row, as read back from `scan_results`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    pub ip: String,
    pub status: String,
    pub rtt_ms: Option<f64>,
    pub hostname: Option<String>,
    pub method: String,
    pub seen_at: f64,
}

impl SqliteStore {
    /// Open (creating if missing) and migrate the database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> SweepResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> SweepResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at REAL NOT NULL,
                ended_at REAL,
                range_text TEXT NOT NULL,
                cycle_seconds INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scan_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scan_id INTEGER NOT NULL,
                ip TEXT NOT NULL,
                status TEXT NOT NULL,
                rtt_ms REAL,
                hostname TEXT,
                method TEXT NOT NULL,
                seen_at REAL NOT NULL,
                FOREIGN KEY(scan_id) REFERENCES scans(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS ix_scan_results_scan_ip ON scan_results (scan_id, ip)",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Result rows of one session, insertion order.
    pub async fn fetch_results(&self, scan_id: i64) -> SweepResult<Vec<StoredResult>> {
        let rows = sqlx::query(
            "SELECT ip, status, rtt_ms, hostname, method, seen_at \
             FROM scan_results WHERE scan_id = ? ORDER BY id",
        )
        .bind(scan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(StoredResult {
                    ip: row.try_get("ip").map_err(storage_err)?,
                    status: row.try_get("status").map_err(storage_err)?,
                    rtt_ms: row.try_get("rtt_ms").map_err(storage_err)?,
                    hostname: row.try_get("hostname").map_err(storage_err)?,
                    method: row.try_get("method").map_err(storage_err)?,
                    seen_at: row.try_get("seen_at").map_err(storage_err)?,
                })
            })
            .collect()
    }

    /// End time of a session, if it has been closed.
    pub async fn scan_ended_at(&self, scan_id: i64) -> SweepResult<Option<f64>> {
        let row = sqlx::query("SELECT ended_at FROM scans WHERE id = ?")
            .bind(scan_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        row.try_get("ended_at").map_err(storage_err)
    }
}

#[async_trait]
impl Storage for SqliteStore {
    async fn begin_scan(
        &self,
        started_at: DateTime<Utc>,
        range_text: &str,
        cycle_seconds: u64,
    ) -> SweepResult<i64> {
        let inserted = sqlx::query(
            "INSERT INTO scans (started_at, range_text, cycle_seconds) VALUES (?, ?, ?)",
        )
        .bind(epoch_seconds(started_at))
        .bind(range_text)
        .bind(cycle_seconds as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(inserted.last_insert_rowid())
    }

    async fn finish_scan(&self, scan_id: i64, ended_at: DateTime<Utc>) -> SweepResult<()> {
        sqlx::query("UPDATE scans SET ended_at = ? WHERE id = ?")
            .bind(epoch_seconds(ended_at))
            .bind(scan_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn save_batch(&self, scan_id: i64, batch: &ScanBatch) -> SweepResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        for result in &batch.results {
            sqlx::query(
                "INSERT INTO scan_results \
                 (scan_id, ip, status, rtt_ms, hostname, method, seen_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(scan_id)
            .bind(result.addr.to_string())
            .bind(result.status.as_str())
            .bind(result.rtt_millis())
            .bind(result.hostname.as_deref())
            .bind(result.method.as_str())
            .bind(epoch_seconds(result.timestamp))
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        debug!(scan_id, rows = batch.results.len(), "batch appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostsweep_common::{ProbeResult, ScanConfig};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    async fn store(dir: &tempfile::TempDir) -> SqliteStore {
        SqliteStore::open(dir.path().join("sweep.db")).await.unwrap()
    }

    fn sample_batch() -> ScanBatch {
        let ts = Utc::now();
        let mut batch = ScanBatch::new(ScanConfig::default(), ts);
        batch.results.push(
            ProbeResult::up(Ipv4Addr::new(10, 0, 0, 1), Duration::from_millis(12), ts)
                .with_hostname("gw.lan".to_string()),
        );
        batch
            .results
            .push(ProbeResult::down(Ipv4Addr::new(10, 0, 0, 2), ts));
        batch
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.db");
        drop(SqliteStore::open(&path).await.unwrap());
        // reopening must not trip on existing tables
        SqliteStore::open(&path).await.unwrap();
    }

    #[tokio::test]
    async fn session_bracket_opens_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        let id = store
            .begin_scan(Utc::now(), "192.168.1.0/24", 300)
            .await
            .unwrap();
        assert_eq!(store.scan_ended_at(id).await.unwrap(), None);

        store.finish_scan(id, Utc::now()).await.unwrap();
        assert!(store.scan_ended_at(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn batch_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let batch = sample_batch();

        let id = store.begin_scan(batch.started_at, "10.0.0.1-10.0.0.2", 0).await.unwrap();
        store.save_batch(id, &batch).await.unwrap();

        let rows = store.fetch_results(id).await.unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].ip, "10.0.0.1");
        assert_eq!(rows[0].status, "UP");
        assert!((rows[0].rtt_ms.unwrap() - 12.0).abs() < 0.001);
        assert_eq!(rows[0].hostname.as_deref(), Some("gw.lan"));
        assert_eq!(rows[0].method, "primary");

        assert_eq!(rows[1].ip, "10.0.0.2");
        assert_eq!(rows[1].status, "DOWN");
        assert_eq!(rows[1].rtt_ms, None);
        assert_eq!(rows[1].hostname, None);
    }

    #[tokio::test]
    async fn sessions_keep_their_rows_separate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let batch = sample_batch();

        let first = store.begin_scan(Utc::now(), "10.0.0.0/30", 0).await.unwrap();
        let second = store.begin_scan(Utc::now(), "10.0.0.0/30", 0).await.unwrap();
        store.save_batch(first, &batch).await.unwrap();

        assert_eq!(store.fetch_results(first).await.unwrap().len(), 2);
        assert!(store.fetch_results(second).await.unwrap().is_empty());
    }
}
