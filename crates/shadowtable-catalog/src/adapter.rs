//! Connection trait for schema reflection and DDL execution

use shadowtable_core::{Backend, Table};

/// Errors surfaced by backend connections
///
/// `TableNotFound` and `TableExists` are distinguished from generic query and
/// execution failures so callers can branch on them (a missing shadow table
/// vs "already migrated" vs an unexpected driver error).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("DDL execution failed: {0}")]
    Execution(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Trait for backend connections that can reflect and create tables
///
/// This is the full capability set the shadow-table engine needs. A
/// connection handle is passed explicitly into every operation; the engine
/// keeps no ambient database state and caches nothing across calls, so
/// concurrent schema changes by other callers are observed on the next
/// reflection.
#[async_trait::async_trait]
pub trait SchemaConnection: Send + Sync {
    /// Adapter name for logging (e.g., "SQLite", "PostgreSQL")
    fn name(&self) -> &'static str;

    /// Backend tag attached to opaque type descriptors from this connection
    fn backend(&self) -> Backend;

    /// Reflect a table's live structure from the backend catalog
    ///
    /// Performs a fresh read on every call, never memoized. Fails with
    /// [`CatalogError::TableNotFound`] when the table does not exist.
    async fn reflect_table(&self, table_name: &str) -> Result<Table, CatalogError>;

    /// Create a table by emitting and executing `CREATE TABLE` DDL
    ///
    /// Fails with [`CatalogError::TableExists`] when a table with that exact
    /// name is already present; the existing table is never altered. DDL
    /// atomicity is whatever the backend provides.
    async fn create_table(&self, table: &Table) -> Result<(), CatalogError>;
}
