//! Backend connection adapters for shadow-table migrations
//!
//! This crate provides the connection surface the migration engine works
//! against: live schema reflection and DDL execution, with one adapter per
//! supported backend.
//!
//! ## Features
//!
//! Enable backend support via Cargo features:
//! - `sqlite` - embedded SQLite engine via rusqlite (default)
//! - `postgres` - PostgreSQL via tokio-postgres
//! - `mysql` - MySQL via mysql_async
//! - `all-backends` - everything above
//!
//! The in-memory [`MemoryConnection`] is always available and needs no
//! external service; unit tests and demos run against it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use shadowtable_catalog::{SchemaConnection, SqliteConnection};
//!
//! let conn = SqliteConnection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE orders (id INTEGER PRIMARY KEY, a INTEGER)").await?;
//! let table = conn.reflect_table("orders").await?;
//! ```

pub mod adapter;
pub mod ddl;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use adapter::{CatalogError, SchemaConnection};
pub use memory::MemoryConnection;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

#[cfg(feature = "postgres")]
pub use postgres::PostgresConnection;

#[cfg(feature = "mysql")]
pub use mysql::MysqlConnection;
