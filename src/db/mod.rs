//! Database layer
//!
//! Database abstraction for the Kursa backend. It supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for hosted deployments)
//!
//! The driver is selected based on configuration. Repositories work
//! against the `DatabasePool` trait so handlers never see the concrete
//! backend.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
