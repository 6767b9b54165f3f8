//! Type descriptor equivalence
//!
//! The comparator is backend-neutral except for one rule: opaque descriptors
//! compare by backend tag and raw type name, because their structure cannot
//! be introspected portably. Everything else is exact structural equality.

use crate::schema::TypeDescriptor;

/// Check whether two column type descriptors are equivalent
///
/// Rules, in order:
/// - `Known` vs `Known`: same family with identical parameters. Exact match
///   only; `INTEGER` vs `BIGINT` or `VARCHAR(255)` vs `VARCHAR(256)` are
///   mismatches.
/// - `Opaque` vs `Opaque`: same backend tag and identical type name. The
///   internal representation is never decomposed, which avoids false
///   mismatches for backend-only type extensions.
/// - `Known` vs `Opaque` (either way): always a mismatch.
pub fn types_equivalent(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    match (a, b) {
        (TypeDescriptor::Known(x), TypeDescriptor::Known(y)) => x == y,
        (
            TypeDescriptor::Opaque {
                backend: a_backend,
                type_name: a_name,
            },
            TypeDescriptor::Opaque {
                backend: b_backend,
                type_name: b_name,
            },
        ) => a_backend == b_backend && a_name == b_name,
        _ => false,
    }
}
