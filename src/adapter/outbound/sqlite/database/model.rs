//! Diesel models for database tables.

use diesel::prelude::*;

use super::schema::portfolio_snapshots;

/// Database row for a portfolio snapshot (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = portfolio_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotRow {
    pub id: i32,
    pub strategy: String,
    pub recorded_at: String,
    pub value: f64,
}

/// New portfolio snapshot for insertion.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = portfolio_snapshots)]
pub struct NewSnapshotRow {
    pub strategy: String,
    pub recorded_at: String,
    pub value: f64,
}
