//! PostgreSQL connection adapter using information_schema
//!
//! Reflection queries `information_schema.columns` plus the key-column view
//! for primary-key membership, scoped to the connection's current schema.
//! Types outside the portable families reflect as opaque descriptors keyed
//! by `udt_name`, which PostgreSQL accepts back verbatim in DDL — so
//! extension types (`citext`, `hstore`, ...) round-trip without being
//! structurally decomposed.
//!
//! Reference: https://www.postgresql.org/docs/current/information-schema-columns.html

use crate::adapter::{CatalogError, SchemaConnection};
use crate::ddl;
use shadowtable_core::{Backend, Column, KnownType, Table, TypeDescriptor};
use std::collections::HashSet;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};

/// PostgreSQL connection adapter
pub struct PostgresConnection {
    client: Client,
}

impl PostgresConnection {
    /// Connect with direct credentials (no TLS)
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let config = format!(
            "host={} port={} dbname={} user={} password={}",
            host.into(),
            port,
            database.into(),
            user.into(),
            password.into()
        );
        Self::from_connection_string(&config).await
    }

    /// Connect from a PostgreSQL connection string
    ///
    /// Standard format: `host=localhost port=5432 dbname=mydb user=u password=p`
    pub async fn from_connection_string(conn_str: &str) -> Result<Self, CatalogError> {
        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        // The driver multiplexes over a background task; it ends when the
        // client is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection task failed");
            }
        });

        Ok(Self { client })
    }

    /// Execute raw DDL statements (semicolon-separated)
    pub async fn execute_batch(&self, sql: &str) -> Result<(), CatalogError> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| CatalogError::Execution(e.to_string()))
    }

    /// Map an information_schema row to a type descriptor
    ///
    /// `data_type` carries the portable spelling, `udt_name` the concrete
    /// catalog type used for the opaque fallback.
    pub fn map_pg_type(
        data_type: &str,
        udt_name: &str,
        char_length: Option<i32>,
        numeric_precision: Option<i32>,
        numeric_scale: Option<i32>,
    ) -> TypeDescriptor {
        match data_type {
            "boolean" => KnownType::Boolean.into(),
            "smallint" => KnownType::SmallInt.into(),
            "integer" => KnownType::Integer.into(),
            "bigint" => KnownType::BigInt.into(),
            "real" => KnownType::Real.into(),
            "double precision" => KnownType::Double.into(),
            "numeric" => KnownType::Decimal {
                precision: numeric_precision.and_then(|p| u16::try_from(p).ok()),
                scale: numeric_scale.and_then(|s| u16::try_from(s).ok()),
            }
            .into(),
            "character varying" => KnownType::Varchar {
                length: char_length.and_then(|n| u32::try_from(n).ok()),
            }
            .into(),
            "text" => KnownType::Text.into(),
            "date" => KnownType::Date.into(),
            "timestamp without time zone" => KnownType::Timestamp.into(),
            // USER-DEFINED, ARRAY, bpchar, timestamptz, ... — everything the
            // portable families do not cover is carried by catalog name.
            _ => TypeDescriptor::opaque(Backend::Postgres, udt_name),
        }
    }

    async fn primary_key_columns(&self, table_name: &str) -> Result<HashSet<String>, CatalogError> {
        let query = r#"
            SELECT kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_name = tc.constraint_name
             AND kcu.table_schema = tc.table_schema
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = current_schema()
              AND tc.table_name = $1
        "#;

        let rows = self
            .client
            .query(query, &[&table_name])
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
    }
}

#[async_trait::async_trait]
impl SchemaConnection for PostgresConnection {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn reflect_table(&self, table_name: &str) -> Result<Table, CatalogError> {
        let query = r#"
            SELECT
                column_name,
                data_type,
                udt_name,
                is_nullable,
                character_maximum_length,
                numeric_precision,
                numeric_scale
            FROM information_schema.columns
            WHERE table_schema = current_schema()
              AND table_name = $1
            ORDER BY ordinal_position
        "#;

        let rows = self
            .client
            .query(query, &[&table_name])
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        if rows.is_empty() {
            return Err(CatalogError::TableNotFound(table_name.to_string()));
        }

        let pk_columns = self.primary_key_columns(table_name).await?;

        let columns = rows
            .iter()
            .map(|row| {
                let name: String = row.get(0);
                let data_type: String = row.get(1);
                let udt_name: String = row.get(2);
                let is_nullable: String = row.get(3);
                let char_length: Option<i32> = row.get(4);
                let numeric_precision: Option<i32> = row.get(5);
                let numeric_scale: Option<i32> = row.get(6);

                let primary_key = pk_columns.contains(&name);
                Column {
                    type_desc: Self::map_pg_type(
                        &data_type,
                        &udt_name,
                        char_length,
                        numeric_precision,
                        numeric_scale,
                    ),
                    nullable: is_nullable.eq_ignore_ascii_case("yes"),
                    primary_key,
                    name,
                }
            })
            .collect();

        tracing::debug!(table = table_name, "reflected table");
        Ok(Table::new(table_name, columns))
    }

    async fn create_table(&self, table: &Table) -> Result<(), CatalogError> {
        let sql = ddl::create_table_sql(table, Backend::Postgres);
        self.client.batch_execute(&sql).await.map_err(|e| {
            if e.code() == Some(&SqlState::DUPLICATE_TABLE) {
                CatalogError::TableExists(table.name.clone())
            } else {
                CatalogError::Execution(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_type_mapping() {
        assert_eq!(
            PostgresConnection::map_pg_type("boolean", "bool", None, None, None),
            KnownType::Boolean.into()
        );
        assert_eq!(
            PostgresConnection::map_pg_type("integer", "int4", None, None, None),
            KnownType::Integer.into()
        );
        assert_eq!(
            PostgresConnection::map_pg_type("bigint", "int8", None, None, None),
            KnownType::BigInt.into()
        );
        assert_eq!(
            PostgresConnection::map_pg_type("double precision", "float8", None, None, None),
            KnownType::Double.into()
        );
        assert_eq!(
            PostgresConnection::map_pg_type("timestamp without time zone", "timestamp", None, None, None),
            KnownType::Timestamp.into()
        );
    }

    #[test]
    fn varchar_carries_length() {
        assert_eq!(
            PostgresConnection::map_pg_type("character varying", "varchar", Some(256), None, None),
            KnownType::Varchar { length: Some(256) }.into()
        );
        assert_eq!(
            PostgresConnection::map_pg_type("character varying", "varchar", None, None, None),
            KnownType::Varchar { length: None }.into()
        );
    }

    #[test]
    fn numeric_carries_precision_and_scale() {
        assert_eq!(
            PostgresConnection::map_pg_type("numeric", "numeric", None, Some(10), Some(2)),
            KnownType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
            .into()
        );
    }

    #[test]
    fn user_defined_types_are_opaque_by_udt_name() {
        assert_eq!(
            PostgresConnection::map_pg_type("USER-DEFINED", "citext", None, None, None),
            TypeDescriptor::opaque(Backend::Postgres, "citext")
        );
        // bpchar and timestamptz are outside the portable families too.
        assert_eq!(
            PostgresConnection::map_pg_type("character", "bpchar", Some(10), None, None),
            TypeDescriptor::opaque(Backend::Postgres, "bpchar")
        );
        assert_eq!(
            PostgresConnection::map_pg_type("timestamp with time zone", "timestamptz", None, None, None),
            TypeDescriptor::opaque(Backend::Postgres, "timestamptz")
        );
    }
}
