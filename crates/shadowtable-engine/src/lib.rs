//! ShadowTable engine - shadow table creation and verification
//!
//! A shadow table mirrors the column structure of a live table under a
//! conventional name so a migration framework can stage data during an
//! online schema change. This crate builds shadow tables and verifies their
//! structural equivalence against the source; the actual data copy belongs
//! to the caller.

pub mod shadow;

pub use shadow::{
    check_shadow_table, create_shadow_table, shadow_table_name, ShadowError, ShadowMismatch,
    SHADOW_TABLE_PREFIX,
};
