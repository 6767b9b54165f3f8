//! ShadowTable Core
//!
//! Backend-neutral data model for online schema migrations: tables, columns,
//! type descriptors, and the type equivalence rules shared by every backend
//! adapter. Nothing in this crate talks to a database.

pub mod compare;
pub mod schema;

pub use compare::types_equivalent;
pub use schema::{Backend, Column, KnownType, Table, TypeDescriptor};
