//! CREATE TABLE rendering per backend dialect
//!
//! Each known type family renders to a spelling the backend reflects back to
//! the same family, so a create-then-reflect round trip is lossless. Opaque
//! descriptors render their raw type text verbatim.

use shadowtable_core::{Backend, Column, KnownType, Table, TypeDescriptor};

/// Quote an identifier for the given dialect
pub fn quote_ident(name: &str, backend: Backend) -> String {
    match backend {
        Backend::MySql => format!("`{}`", name.replace('`', "``")),
        _ => format!("\"{}\"", name.replace('"', "\"\"")),
    }
}

/// Render a type descriptor as backend DDL
pub fn render_type(type_desc: &TypeDescriptor, backend: Backend) -> String {
    let known = match type_desc {
        // Raw spec verbatim; the backend reported it, the backend accepts it.
        TypeDescriptor::Opaque { type_name, .. } => return type_name.clone(),
        TypeDescriptor::Known(known) => known,
    };

    match known {
        KnownType::Boolean => "BOOLEAN".to_string(),
        KnownType::SmallInt => "SMALLINT".to_string(),
        KnownType::Integer => match backend {
            Backend::MySql => "INT".to_string(),
            _ => "INTEGER".to_string(),
        },
        KnownType::BigInt => "BIGINT".to_string(),
        KnownType::Real => match backend {
            Backend::Postgres => "REAL".to_string(),
            _ => "FLOAT".to_string(),
        },
        KnownType::Double => match backend {
            Backend::Postgres => "DOUBLE PRECISION".to_string(),
            _ => "DOUBLE".to_string(),
        },
        KnownType::Decimal { precision, scale } => match (precision, scale) {
            (Some(p), Some(s)) => format!("DECIMAL({}, {})", p, s),
            (Some(p), None) => format!("DECIMAL({})", p),
            _ => "DECIMAL".to_string(),
        },
        KnownType::Varchar { length } => match (length, backend) {
            (Some(n), _) => format!("VARCHAR({})", n),
            // MySQL requires a VARCHAR length; an unbounded string is TEXT.
            // Unbounded Varchar never arises from MySQL reflection, so the
            // round trip stays consistent within that backend.
            (None, Backend::MySql) => "TEXT".to_string(),
            (None, _) => "VARCHAR".to_string(),
        },
        KnownType::Text => "TEXT".to_string(),
        KnownType::Date => "DATE".to_string(),
        KnownType::Timestamp => match backend {
            Backend::MySql => "DATETIME".to_string(),
            _ => "TIMESTAMP".to_string(),
        },
    }
}

fn render_column(column: &Column, backend: Backend, inline_pk: bool) -> String {
    let mut def = format!(
        "{} {}",
        quote_ident(&column.name, backend),
        render_type(&column.type_desc, backend)
    );
    if inline_pk && column.primary_key {
        def.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        def.push_str(" NOT NULL");
    }
    def
}

/// Render a full `CREATE TABLE` statement for the given dialect
///
/// Columns keep their declared order. A single primary-key column is emitted
/// inline; a composite key becomes a table-level `PRIMARY KEY (...)` clause.
pub fn create_table_sql(table: &Table, backend: Backend) -> String {
    let pk_columns: Vec<&Column> = table.columns.iter().filter(|c| c.primary_key).collect();
    let inline_pk = pk_columns.len() == 1;

    let mut defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| render_column(c, backend, inline_pk))
        .collect();

    if pk_columns.len() > 1 {
        let names: Vec<String> = pk_columns
            .iter()
            .map(|c| quote_ident(&c.name, backend))
            .collect();
        defs.push(format!("PRIMARY KEY ({})", names.join(", ")));
    }

    format!(
        "CREATE TABLE {} ({})",
        quote_ident(&table.name, backend),
        defs.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

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

    #[test]
    fn sqlite_create_table() {
        assert_eq!(
            create_table_sql(&orders(), Backend::Sqlite),
            "CREATE TABLE \"orders\" (\"id\" INTEGER PRIMARY KEY, \
             \"a\" INTEGER, \"c\" VARCHAR(256))"
        );
    }

    #[test]
    fn mysql_uses_backticks_and_int() {
        assert_eq!(
            create_table_sql(&orders(), Backend::MySql),
            "CREATE TABLE `orders` (`id` INT PRIMARY KEY, \
             `a` INT, `c` VARCHAR(256))"
        );
    }

    #[test]
    fn postgres_float_spellings() {
        assert_eq!(
            render_type(&KnownType::Double.into(), Backend::Postgres),
            "DOUBLE PRECISION"
        );
        assert_eq!(render_type(&KnownType::Real.into(), Backend::Postgres), "REAL");
        assert_eq!(render_type(&KnownType::Real.into(), Backend::Sqlite), "FLOAT");
    }

    #[test]
    fn not_null_rendered() {
        let table = Table::new(
            "t",
            vec![Column::new("a", KnownType::Text).not_null()],
        );
        assert_eq!(
            create_table_sql(&table, Backend::Postgres),
            "CREATE TABLE \"t\" (\"a\" TEXT NOT NULL)"
        );
    }

    #[test]
    fn composite_primary_key_is_table_level() {
        let table = Table::new(
            "t",
            vec![
                Column::new("a", KnownType::Integer).primary_key(),
                Column::new("b", KnownType::Integer).primary_key(),
            ],
        );
        assert_eq!(
            create_table_sql(&table, Backend::Sqlite),
            "CREATE TABLE \"t\" (\"a\" INTEGER NOT NULL, \"b\" INTEGER NOT NULL, \
             PRIMARY KEY (\"a\", \"b\"))"
        );
    }

    #[test]
    fn opaque_type_rendered_verbatim() {
        let table = Table::new(
            "t",
            vec![Column::new(
                "c",
                TypeDescriptor::opaque(Backend::Sqlite, "CustomType"),
            )],
        );
        assert_eq!(
            create_table_sql(&table, Backend::Sqlite),
            "CREATE TABLE \"t\" (\"c\" CustomType)"
        );
    }

    #[test]
    fn quoting_escapes_embedded_quotes() {
        assert_eq!(quote_ident("we\"ird", Backend::Sqlite), "\"we\"\"ird\"");
        assert_eq!(quote_ident("we`ird", Backend::MySql), "`we``ird`");
    }
}
