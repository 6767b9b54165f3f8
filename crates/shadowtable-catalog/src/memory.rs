//! In-memory connection for tests and demos
//!
//! Stores reflected tables in a map instead of talking to a real backend.
//! Useful for unit testing the shadow-table engine and for simulating
//! catalog states (missing columns, tampered shadows) without DDL.

use crate::adapter::{CatalogError, SchemaConnection};
use shadowtable_core::{Backend, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory schema catalog
///
/// Thread-safe and cheaply cloneable; clones share the same table map, so a
/// table created through one handle is visible through the others.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryConnection {
    /// Create an empty in-memory catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a table directly, bypassing the create path
    ///
    /// Test setup hook: lets a fixture install a tampered shadow table that
    /// `create_table` would refuse to overwrite.
    pub async fn put_table(&self, table: Table) {
        self.tables.write().await.insert(table.name.clone(), table);
    }

    /// Remove a table, returning whether it was present
    pub async fn drop_table(&self, table_name: &str) -> bool {
        self.tables.write().await.remove(table_name).is_some()
    }

    /// Check whether a table exists
    pub async fn has_table(&self, table_name: &str) -> bool {
        self.tables.read().await.contains_key(table_name)
    }

    /// All table names currently in the catalog
    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait::async_trait]
impl SchemaConnection for MemoryConnection {
    fn name(&self) -> &'static str {
        "Memory"
    }

    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn reflect_table(&self, table_name: &str) -> Result<Table, CatalogError> {
        self.tables
            .read()
            .await
            .get(table_name)
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(table_name.to_string()))
    }

    async fn create_table(&self, table: &Table) -> Result<(), CatalogError> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(&table.name) {
            return Err(CatalogError::TableExists(table.name.clone()));
        }
        tables.insert(table.name.clone(), table.clone());
        Ok(())
    }
}
