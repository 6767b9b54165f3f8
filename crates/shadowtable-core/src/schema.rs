//! Table, column, and type descriptor model
//!
//! Every backend adapter reflects live schema into these types, and the
//! shadow-table engine only ever reasons about them. Type descriptors are
//! deliberately split into `Known` (portable, structurally comparable) and
//! `Opaque` (backend-specific, compared by name only).

use serde::{Deserialize, Serialize};

/// Identifies which backend produced a reflected schema object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Embedded file-based engine (SQLite)
    Sqlite,

    /// PostgreSQL client-server engine
    Postgres,

    /// MySQL client-server engine
    MySql,

    /// In-memory adapter used for tests and demos
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "SQLite"),
            Self::Postgres => write!(f, "PostgreSQL"),
            Self::MySql => write!(f, "MySQL"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

/// Portable type families with exact-match semantics
///
/// Each family corresponds to a concrete storage type on every supported
/// backend, so a descriptor reflected from one table can be re-emitted as DDL
/// for its shadow and reflect back to the same descriptor.
///
/// Equivalence is strict: same family, identical parameters. There is no
/// widening or narrowing tolerance, so `Integer` vs `BigInt` is a mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum KnownType {
    /// Boolean type
    Boolean,

    /// 2-byte integer
    SmallInt,

    /// 4-byte integer
    Integer,

    /// 8-byte integer
    BigInt,

    /// 4-byte floating point
    Real,

    /// 8-byte floating point
    Double,

    /// Fixed-point decimal with optional precision and scale
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },

    /// Bounded string with optional length limit
    Varchar { length: Option<u32> },

    /// Unbounded string
    Text,

    /// Date (no time component)
    Date,

    /// Timestamp (date and time, no zone)
    Timestamp,
}

impl std::fmt::Display for KnownType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::Real => write!(f, "FLOAT"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            Self::Varchar { length } => match length {
                Some(n) => write!(f, "VARCHAR({})", n),
                None => write!(f, "VARCHAR"),
            },
            Self::Text => write!(f, "TEXT"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A column type as observed through reflection
///
/// `Known` descriptors decompose into a portable family; `Opaque` descriptors
/// keep the backend's raw type text because the driver cannot decompose them
/// portably (extension types, user-defined types, exotic built-ins).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDescriptor {
    /// A portable type family with parameters
    Known(KnownType),

    /// A backend-specific type, carried by name only
    Opaque {
        /// Backend the raw spec belongs to
        backend: Backend,

        /// Raw type text as the backend reports and accepts it
        type_name: String,
    },
}

impl TypeDescriptor {
    /// Shorthand for an opaque descriptor
    pub fn opaque(backend: Backend, type_name: impl Into<String>) -> Self {
        Self::Opaque {
            backend,
            type_name: type_name.into(),
        }
    }
}

impl From<KnownType> for TypeDescriptor {
    fn from(ty: KnownType) -> Self {
        Self::Known(ty)
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(ty) => write!(f, "{}", ty),
            Self::Opaque { backend, type_name } => {
                write!(f, "{} ({} opaque)", type_name, backend)
            }
        }
    }
}

/// A column in a table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,

    /// Reflected type descriptor
    pub type_desc: TypeDescriptor,

    /// Whether NULL values are accepted
    pub nullable: bool,

    /// Whether the column is part of the primary key
    pub primary_key: bool,
}

impl Column {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, type_desc: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc: type_desc.into(),
            nullable: true,
            primary_key: false,
        }
    }

    /// Mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as part of the primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// An ordered collection of columns under a table name
///
/// Column order matters for DDL emission but not for equivalence checks.
/// Instances are transient: re-reflected on every operation, never cached,
/// because concurrent migrations may change the live schema between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name as known to the backend catalog
    pub name: String,

    /// Ordered list of columns
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table from a name and columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
