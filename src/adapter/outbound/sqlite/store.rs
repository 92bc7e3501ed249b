//! SQLite snapshot store implementation.
//!
//! Provides durable RiskMonitor history using SQLite and Diesel ORM.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{NewSnapshotRow, SnapshotRow};
use crate::adapter::outbound::sqlite::database::schema::portfolio_snapshots;
use crate::domain::snapshot::PortfolioSnapshot;
use crate::error::{Error, Result};
use crate::port::outbound::snapshot::SnapshotStore;

/// SQLite-backed snapshot store.
///
/// Rows are returned in insertion order, which the owning session keeps
/// time-ordered.
pub struct SqliteSnapshotStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteSnapshotStore {
    /// Create a new SQLite snapshot store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn from_row(row: SnapshotRow) -> Result<PortfolioSnapshot> {
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| Error::Parse(e.to_string()))?
            .with_timezone(&Utc);
        Ok(PortfolioSnapshot::new(timestamp, row.value))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn append(&self, strategy: &str, snapshot: &PortfolioSnapshot) -> Result<()> {
        let row = NewSnapshotRow {
            strategy: strategy.to_string(),
            recorded_at: snapshot.timestamp.to_rfc3339(),
            value: snapshot.value,
        };
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        diesel::insert_into(portfolio_snapshots::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn load(&self, strategy: &str) -> Result<Vec<PortfolioSnapshot>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<SnapshotRow> = portfolio_snapshots::table
            .filter(portfolio_snapshots::strategy.eq(strategy))
            .order(portfolio_snapshots::id.asc())
            .select(SnapshotRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn strategies(&self) -> Result<Vec<String>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        portfolio_snapshots::table
            .select(portfolio_snapshots::strategy)
            .distinct()
            .order(portfolio_snapshots::strategy.asc())
            .load::<String>(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn store() -> (TempDir, SqliteSnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteSnapshotStore::new(pool))
    }

    fn at(day: i64, value: f64) -> PortfolioSnapshot {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        PortfolioSnapshot::new(start + Duration::days(day), value)
    }

    #[test]
    fn append_then_load_in_order() {
        let (_dir, store) = store();
        store.append("balanced", &at(0, 100.0)).unwrap();
        store.append("balanced", &at(1, 110.0)).unwrap();
        store.append("aggressive", &at(0, 50.0)).unwrap();

        let history = store.load("balanced").unwrap();
        assert_eq!(history, vec![at(0, 100.0), at(1, 110.0)]);
    }

    #[test]
    fn load_unknown_strategy_is_empty() {
        let (_dir, store) = store();
        assert!(store.load("nobody").unwrap().is_empty());
    }

    #[test]
    fn strategies_are_distinct_and_sorted() {
        let (_dir, store) = store();
        store.append("conservative", &at(0, 1.0)).unwrap();
        store.append("balanced", &at(0, 1.0)).unwrap();
        store.append("balanced", &at(1, 2.0)).unwrap();

        assert_eq!(
            store.strategies().unwrap(),
            vec!["balanced".to_string(), "conservative".to_string()]
        );
    }

    #[test]
    fn append_waits_for_another_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.db").display().to_string();
        let writer_pool = create_pool(&path).unwrap();
        run_migrations(&writer_pool).unwrap();
        let store = SqliteSnapshotStore::new(create_pool(&path).unwrap());

        let mut writer = writer_pool.get().unwrap();
        diesel::sql_query("BEGIN IMMEDIATE")
            .execute(&mut *writer)
            .unwrap();
        let release = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(300));
            diesel::sql_query("COMMIT").execute(&mut *writer).unwrap();
        });

        store.append("balanced", &at(0, 100.0)).unwrap();
        release.join().unwrap();

        assert_eq!(store.load("balanced").unwrap(), vec![at(0, 100.0)]);
    }
}
