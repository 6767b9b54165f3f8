//! SQLite connection adapter using rusqlite
//!
//! The embedded engine. Reflection reads `pragma_table_info`, which reports
//! the declared column type text; SQLite preserves whatever type name the
//! DDL used, so opaque round trips keep their exact spelling.
//!
//! rusqlite is synchronous; the connection is held behind a `tokio` mutex so
//! the adapter satisfies the async [`SchemaConnection`] trait without
//! blocking other tasks on the same handle.

use crate::adapter::{CatalogError, SchemaConnection};
use crate::ddl;
use shadowtable_core::{Backend, Column, KnownType, Table, TypeDescriptor};
use std::path::Path;
use tokio::sync::Mutex;

/// SQLite connection adapter
pub struct SqliteConnection {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteConnection {
    /// Open a database file, creating it if absent
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| CatalogError::Connection(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| CatalogError::Connection(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Execute raw DDL statements (semicolon-separated)
    ///
    /// For callers and test fixtures that need schema changes beyond the
    /// engine's own `CREATE TABLE` path, e.g. `ALTER TABLE ... ADD COLUMN`.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), CatalogError> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql)
            .map_err(|e| CatalogError::Execution(e.to_string()))
    }

    /// Map a declared SQLite column type to a type descriptor
    ///
    /// SQLite accepts any identifier as a column type (it only derives an
    /// affinity from it), so anything outside the portable families comes
    /// back as an opaque descriptor carrying the declared text verbatim.
    pub fn map_decl_type(decl: &str) -> TypeDescriptor {
        let decl = decl.trim();
        let (base, params) = split_type_params(decl);

        match base.to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => KnownType::Boolean.into(),
            "SMALLINT" | "INT2" => KnownType::SmallInt.into(),
            "INTEGER" | "INT" | "INT4" => KnownType::Integer.into(),
            "BIGINT" | "INT8" => KnownType::BigInt.into(),
            "FLOAT" | "REAL" => KnownType::Real.into(),
            "DOUBLE" | "DOUBLE PRECISION" => KnownType::Double.into(),
            "DECIMAL" | "NUMERIC" => KnownType::Decimal {
                precision: params.first().copied().map(|p| p as u16),
                scale: params.get(1).copied().map(|s| s as u16),
            }
            .into(),
            "VARCHAR" | "CHARACTER VARYING" => KnownType::Varchar {
                length: params.first().copied(),
            }
            .into(),
            "TEXT" | "CLOB" => KnownType::Text.into(),
            "DATE" => KnownType::Date.into(),
            "TIMESTAMP" | "DATETIME" => KnownType::Timestamp.into(),
            _ => TypeDescriptor::opaque(Backend::Sqlite, decl),
        }
    }
}

/// Split `VARCHAR(256)` into `("VARCHAR", [256])`
fn split_type_params(decl: &str) -> (&str, Vec<u32>) {
    match decl.split_once('(') {
        Some((base, rest)) => {
            let params = rest
                .trim_end_matches(')')
                .split(',')
                .filter_map(|p| p.trim().parse().ok())
                .collect();
            (base.trim(), params)
        }
        None => (decl, Vec::new()),
    }
}

#[async_trait::async_trait]
impl SchemaConnection for SqliteConnection {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn reflect_table(&self, table_name: &str) -> Result<Table, CatalogError> {
        let conn = self.conn.lock().await;

        // NOTNULL is a keyword, hence the quoting.
        let mut stmt = conn
            .prepare("SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1)")
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let columns = stmt
            .query_map(rusqlite::params![table_name], |row| {
                let name: String = row.get(0)?;
                let decl: String = row.get(1)?;
                let not_null: i64 = row.get(2)?;
                let pk: i64 = row.get(3)?;
                Ok(Column {
                    name,
                    type_desc: Self::map_decl_type(&decl),
                    nullable: not_null == 0 && pk == 0,
                    primary_key: pk > 0,
                })
            })
            .map_err(|e| CatalogError::Query(e.to_string()))?
            .collect::<Result<Vec<Column>, rusqlite::Error>>()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        // A table always has at least one column; an empty pragma result
        // means the table is absent from the catalog.
        if columns.is_empty() {
            return Err(CatalogError::TableNotFound(table_name.to_string()));
        }

        tracing::debug!(table = table_name, columns = columns.len(), "reflected table");
        Ok(Table::new(table_name, columns))
    }

    async fn create_table(&self, table: &Table) -> Result<(), CatalogError> {
        let sql = ddl::create_table_sql(table, Backend::Sqlite);
        let conn = self.conn.lock().await;
        conn.execute_batch(&sql).map_err(|e| {
            if e.to_string().contains("already exists") {
                CatalogError::TableExists(table.name.clone())
            } else {
                CatalogError::Execution(e.to_string())
            }
        })
    }
}
