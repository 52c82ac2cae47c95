//! Full-sweep partial update: copy every field except the identity.

use crate::error::FilterError;
use crate::schema::{introspect, Filterable};

/// Copy every declared field of `incoming` onto `target` except
/// `identity_field`. Returns the number of fields copied.
///
/// Relation (foreign-key) fields are copied like any other field, so a payload
/// that carries a different or default relation value reassigns it.
///
/// The caller must have checked that both records share the same identity.
/// `target` is changed in place and not persisted.
pub fn apply_update<E: Filterable>(
    target: &mut E,
    incoming: &E,
    identity_field: &str,
) -> Result<usize, FilterError> {
    let identity = introspect::resolve::<E>(identity_field)?;
    let mut copied = 0;
    for field in E::fields() {
        if std::ptr::eq(field, identity) {
            continue;
        }
        field.copy(target, incoming);
        copied += 1;
    }
    tracing::debug!(entity = E::ENTITY, identity = identity.name(), copied, "applied update");
    Ok(copied)
}
