//! Shadow table builder and verifier
//!
//! The shadow name is always derived from the source name by prefixing
//! [`SHADOW_TABLE_PREFIX`]; no other naming scheme is produced or accepted,
//! so verification can locate the shadow deterministically without a side
//! lookup table.
//!
//! Every irregularity raises a distinguishable error; there is no boolean
//! "false" outcome anywhere on the verification path. Neither operation
//! retries internally or caches reflected schema between calls.

use shadowtable_catalog::{CatalogError, SchemaConnection};
use shadowtable_core::{types_equivalent, Column, Table, TypeDescriptor};
use std::collections::{BTreeSet, HashMap};

/// Prefix joined verbatim to a source table name to form its shadow's name
pub const SHADOW_TABLE_PREFIX: &str = "shadow_";

/// Derive the conventional shadow table name for a source table
pub fn shadow_table_name(table_name: &str) -> String {
    format!("{SHADOW_TABLE_PREFIX}{table_name}")
}

/// How a shadow table structurally diverges from its source
///
/// All sub-cases share one propagation path ([`ShadowError::Mismatch`]); the
/// variant tells callers which irregularity was detected. Column name lists
/// are sorted for deterministic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShadowMismatch {
    /// Source columns absent from the shadow table
    MissingColumns(Vec<String>),

    /// Shadow columns absent from the source table; never tolerated, even
    /// when they would be harmless for the data copy
    UnexpectedColumns(Vec<String>),

    /// A shared column whose type descriptors are not equivalent
    TypeMismatch {
        column: String,
        source: TypeDescriptor,
        shadow: TypeDescriptor,
    },
}

impl std::fmt::Display for ShadowMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumns(names) => {
                write!(f, "missing column(s): {}", names.join(", "))
            }
            Self::UnexpectedColumns(names) => {
                write!(f, "unexpected column(s): {}", names.join(", "))
            }
            Self::TypeMismatch {
                column,
                source,
                shadow,
            } => write!(
                f,
                "column '{}' type differs: source is {}, shadow is {}",
                column, source, shadow
            ),
        }
    }
}

/// Errors raised by shadow table creation and verification
#[derive(Debug)]
pub enum ShadowError {
    /// Builder invoked with both or neither of `table` / `table_name`
    InvalidArguments,

    /// A shadow table with the derived name already exists; it is left
    /// unmodified
    ShadowTableExists(String),

    /// Structural divergence between a table and its shadow
    Mismatch {
        source: String,
        shadow: String,
        mismatch: ShadowMismatch,
    },

    /// Backend failure, including `TableNotFound` from reflection; never
    /// downgraded to a boolean
    Catalog(CatalogError),
}

// Manual impls instead of a thiserror derive: the `Mismatch.source` field is a
// plain String, which thiserror would otherwise force into the Error::source
// role.
impl std::fmt::Display for ShadowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArguments => {
                write!(f, "exactly one of `table` and `table_name` must be provided")
            }
            Self::ShadowTableExists(name) => {
                write!(f, "shadow table already exists: {name}")
            }
            Self::Mismatch {
                source,
                shadow,
                mismatch,
            } => write!(
                f,
                "shadow table `{shadow}` does not match `{source}`: {mismatch}"
            ),
            Self::Catalog(err) => std::fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ShadowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => std::error::Error::source(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for ShadowError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

/// Create a shadow table mirroring a source table's columns
///
/// Exactly one of `table` / `table_name` selects the source: a caller that
/// already holds a reflected [`Table`] passes it directly, otherwise the
/// source is freshly reflected by name. `overrides` maps column names to
/// fully specified replacement columns and is the required path for opaque
/// types the caller must respecify; every other column is cloned from the
/// source as-is, preserving order and nullability.
///
/// Fails with [`ShadowError::ShadowTableExists`] when the derived name is
/// already taken — the existing table is never altered. On success the new
/// shadow table satisfies [`check_shadow_table`] for the source name.
pub async fn create_shadow_table(
    conn: &dyn SchemaConnection,
    table: Option<&Table>,
    table_name: Option<&str>,
    overrides: &HashMap<String, Column>,
) -> Result<Table, ShadowError> {
    let source = match (table, table_name) {
        (Some(table), None) => table.clone(),
        (None, Some(name)) => conn.reflect_table(name).await?,
        _ => return Err(ShadowError::InvalidArguments),
    };

    let shadow_name = shadow_table_name(&source.name);
    match conn.reflect_table(&shadow_name).await {
        Ok(_) => return Err(ShadowError::ShadowTableExists(shadow_name)),
        Err(CatalogError::TableNotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let columns = source
        .columns
        .iter()
        .map(|col| overrides.get(&col.name).cloned().unwrap_or_else(|| col.clone()))
        .collect();
    let shadow = Table::new(shadow_name, columns);

    match conn.create_table(&shadow).await {
        Ok(()) => {}
        // Lost a race with another creator; same outcome as the pre-check.
        Err(CatalogError::TableExists(name)) => return Err(ShadowError::ShadowTableExists(name)),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        backend = conn.name(),
        source = %source.name,
        shadow = %shadow.name,
        "created shadow table"
    );
    Ok(shadow)
}

/// Verify that a table and its shadow are structurally equivalent
///
/// Reflects both tables fresh, requires their column-name sets to be exactly
/// equal, and compares every shared column's type descriptor under the
/// exact-equivalence rules of [`types_equivalent`]. `Ok(())` means the
/// shadow mirrors the source; any irregularity raises before a value is
/// produced, so callers can always tell *why* verification failed.
///
/// A missing source or shadow table surfaces as the catalog's
/// `TableNotFound` — creating the shadow first is the caller's
/// responsibility.
pub async fn check_shadow_table(
    conn: &dyn SchemaConnection,
    table_name: &str,
) -> Result<(), ShadowError> {
    let source = conn.reflect_table(table_name).await?;
    let shadow = conn.reflect_table(&shadow_table_name(table_name)).await?;

    let source_names: BTreeSet<&str> = source.columns.iter().map(|c| c.name.as_str()).collect();
    let shadow_names: BTreeSet<&str> = shadow.columns.iter().map(|c| c.name.as_str()).collect();

    let missing: Vec<String> = source_names
        .difference(&shadow_names)
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(mismatch(&source, &shadow, ShadowMismatch::MissingColumns(missing)));
    }

    let unexpected: Vec<String> = shadow_names
        .difference(&source_names)
        .map(|name| name.to_string())
        .collect();
    if !unexpected.is_empty() {
        return Err(mismatch(
            &source,
            &shadow,
            ShadowMismatch::UnexpectedColumns(unexpected),
        ));
    }

    // Name sets are equal from here on; every source column has a partner.
    for column in &source.columns {
        let Some(counterpart) = shadow.find_column(&column.name) else {
            continue;
        };
        if !types_equivalent(&column.type_desc, &counterpart.type_desc) {
            return Err(mismatch(
                &source,
                &shadow,
                ShadowMismatch::TypeMismatch {
                    column: column.name.clone(),
                    source: column.type_desc.clone(),
                    shadow: counterpart.type_desc.clone(),
                },
            ));
        }
    }

    tracing::debug!(backend = conn.name(), table = table_name, "shadow table verified");
    Ok(())
}

fn mismatch(source: &Table, shadow: &Table, mismatch: ShadowMismatch) -> ShadowError {
    ShadowError::Mismatch {
        source: source.name.clone(),
        shadow: shadow.name.clone(),
        mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shadowtable_catalog::MemoryConnection;
    use shadowtable_core::{Backend, KnownType};

    fn orders() -> Table {
        Table::new(
            "orders",
            vec![
                Column::new("id", KnownType::Integer).primary_key(),
                Column::new("a", KnownType::Integer),
                Column::new("c", KnownType::Varchar { length: Some(256) }),
            ],
        )
    }

    async fn connection_with_orders() -> MemoryConnection {
        let conn = MemoryConnection::new();
        conn.create_table(&orders()).await.unwrap();
        conn
    }

    #[test]
    fn shadow_name_is_prefix_plus_source() {
        assert_eq!(shadow_table_name("orders"), "shadow_orders");
        assert_eq!(SHADOW_TABLE_PREFIX, "shadow_");
    }

    #[tokio::test]
    async fn create_then_verify() {
        let conn = connection_with_orders().await;

        let shadow = create_shadow_table(&conn, None, Some("orders"), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(shadow.name, "shadow_orders");
        assert_eq!(shadow.column_names(), vec!["id", "a", "c"]);

        check_shadow_table(&conn, "orders").await.unwrap();
    }

    #[tokio::test]
    async fn create_by_table_instance() {
        let conn = connection_with_orders().await;

        create_shadow_table(&conn, Some(&orders()), None, &HashMap::new())
            .await
            .unwrap();
        check_shadow_table(&conn, "orders").await.unwrap();
    }

    #[tokio::test]
    async fn both_arguments_invalid() {
        let conn = connection_with_orders().await;
        let table = orders();

        let result =
            create_shadow_table(&conn, Some(&table), Some("orders"), &HashMap::new()).await;
        assert!(matches!(result, Err(ShadowError::InvalidArguments)));
    }

    #[tokio::test]
    async fn neither_argument_invalid() {
        let conn = MemoryConnection::new();
        let result = create_shadow_table(&conn, None, None, &HashMap::new()).await;
        assert!(matches!(result, Err(ShadowError::InvalidArguments)));
    }

    #[tokio::test]
    async fn duplicate_create_leaves_first_shadow_intact() {
        let conn = connection_with_orders().await;

        let first = create_shadow_table(&conn, None, Some("orders"), &HashMap::new())
            .await
            .unwrap();

        let result = create_shadow_table(&conn, None, Some("orders"), &HashMap::new()).await;
        assert!(
            matches!(result, Err(ShadowError::ShadowTableExists(ref name)) if name == "shadow_orders")
        );

        // First shadow table untouched.
        assert_eq!(conn.reflect_table("shadow_orders").await.unwrap(), first);
    }

    #[tokio::test]
    async fn verify_without_shadow_is_table_not_found() {
        let conn = connection_with_orders().await;

        let result = check_shadow_table(&conn, "orders").await;
        assert!(matches!(
            result,
            Err(ShadowError::Catalog(CatalogError::TableNotFound(ref name)))
                if name == "shadow_orders"
        ));
    }

    #[tokio::test]
    async fn verify_missing_source_is_table_not_found() {
        let conn = MemoryConnection::new();
        let result = check_shadow_table(&conn, "absent").await;
        assert!(matches!(
            result,
            Err(ShadowError::Catalog(CatalogError::TableNotFound(ref name))) if name == "absent"
        ));
    }

    #[tokio::test]
    async fn missing_column_is_named() {
        let conn = connection_with_orders().await;
        conn.put_table(Table::new(
            "shadow_orders",
            vec![
                Column::new("id", KnownType::Integer),
                Column::new("a", KnownType::Integer),
                // c is missing
            ],
        ))
        .await;

        let result = check_shadow_table(&conn, "orders").await;
        match result {
            Err(ShadowError::Mismatch { mismatch, .. }) => {
                assert_eq!(mismatch, ShadowMismatch::MissingColumns(vec!["c".to_string()]));
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unexpected_column_is_named() {
        let conn = connection_with_orders().await;

        let mut shadow = orders();
        shadow.name = "shadow_orders".to_string();
        shadow.columns.push(Column::new("d", KnownType::Integer));
        conn.put_table(shadow).await;

        let result = check_shadow_table(&conn, "orders").await;
        match result {
            Err(ShadowError::Mismatch { mismatch, .. }) => {
                assert_eq!(
                    mismatch,
                    ShadowMismatch::UnexpectedColumns(vec!["d".to_string()])
                );
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn type_family_difference_is_a_mismatch() {
        let conn = connection_with_orders().await;

        let mut shadow = orders();
        shadow.name = "shadow_orders".to_string();
        // a: INTEGER in the source, VARCHAR(256) in the shadow.
        shadow.columns[1] = Column::new("a", KnownType::Varchar { length: Some(256) });
        conn.put_table(shadow).await;

        let result = check_shadow_table(&conn, "orders").await;
        match result {
            Err(ShadowError::Mismatch { mismatch, .. }) => match mismatch {
                ShadowMismatch::TypeMismatch { column, .. } => assert_eq!(column, "a"),
                other => panic!("expected type mismatch, got {:?}", other),
            },
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn strict_no_widening_between_integer_families() {
        let conn = MemoryConnection::new();
        conn.create_table(&Table::new(
            "t",
            vec![Column::new("n", KnownType::Integer)],
        ))
        .await
        .unwrap();
        conn.put_table(Table::new(
            "shadow_t",
            vec![Column::new("n", KnownType::BigInt)],
        ))
        .await;

        let result = check_shadow_table(&conn, "t").await;
        assert!(matches!(
            result,
            Err(ShadowError::Mismatch {
                mismatch: ShadowMismatch::TypeMismatch { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn matching_opaque_types_verify() {
        let conn = MemoryConnection::new();
        let custom = TypeDescriptor::opaque(Backend::Memory, "CustomType");
        conn.create_table(&Table::new(
            "t",
            vec![
                Column::new("id", KnownType::Integer).primary_key(),
                Column::new("c", custom.clone()),
            ],
        ))
        .await
        .unwrap();
        conn.put_table(Table::new(
            "shadow_t",
            vec![
                Column::new("id", KnownType::Integer),
                Column::new("c", custom),
            ],
        ))
        .await;

        check_shadow_table(&conn, "t").await.unwrap();
    }

    #[tokio::test]
    async fn opaque_vs_known_never_verifies() {
        let conn = MemoryConnection::new();
        conn.create_table(&Table::new(
            "t",
            vec![Column::new("c", TypeDescriptor::opaque(Backend::Memory, "INTEGER"))],
        ))
        .await
        .unwrap();
        conn.put_table(Table::new(
            "shadow_t",
            vec![Column::new("c", KnownType::Integer)],
        ))
        .await;

        let result = check_shadow_table(&conn, "t").await;
        assert!(matches!(
            result,
            Err(ShadowError::Mismatch {
                mismatch: ShadowMismatch::TypeMismatch { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn override_replaces_column_verbatim() {
        let conn = MemoryConnection::new();
        let custom = TypeDescriptor::opaque(Backend::Memory, "CustomType");
        conn.create_table(&Table::new(
            "t",
            vec![
                Column::new("id", KnownType::Integer).primary_key(),
                Column::new("a", custom.clone()),
            ],
        ))
        .await
        .unwrap();

        let overrides =
            HashMap::from([("a".to_string(), Column::new("a", custom.clone()).not_null())]);
        let shadow = create_shadow_table(&conn, None, Some("t"), &overrides)
            .await
            .unwrap();

        let a = shadow.find_column("a").unwrap();
        assert_eq!(a.type_desc, custom);
        assert!(!a.nullable);

        check_shadow_table(&conn, "t").await.unwrap();
    }

    #[tokio::test]
    async fn mismatch_messages_name_the_columns() {
        let err = ShadowError::Mismatch {
            source: "orders".to_string(),
            shadow: "shadow_orders".to_string(),
            mismatch: ShadowMismatch::UnexpectedColumns(vec!["d".to_string()]),
        };
        assert_eq!(
            err.to_string(),
            "shadow table `shadow_orders` does not match `orders`: unexpected column(s): d"
        );
    }
}
