//! Field lookup by name over the static per-type registry.
//!
//! Each entity type owns a name -> position index that is built on first use and
//! kept for the process lifetime. The schema is fixed at compile time, so the
//! index is never invalidated.

use crate::error::{FieldError, FilterError};
use crate::schema::{Field, FieldValue, Filterable};
use std::collections::HashMap;

pub type FieldIndex = HashMap<&'static str, usize>;

/// Build the index for one entity type. Called once per type from
/// [`Filterable::field_index`].
pub fn build_index<E: 'static>(entity: &'static str, fields: &'static [Field<E>]) -> FieldIndex {
    tracing::debug!(entity, fields = fields.len(), "building field index");
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name(), i))
        .collect()
}

/// Resolve a field of `E` by its exact (case-sensitive) name.
pub fn resolve<E: Filterable>(name: &str) -> Result<&'static Field<E>, FilterError> {
    E::field_index()
        .get(name)
        .map(|&i| &E::fields()[i])
        .ok_or_else(|| FilterError::UnknownField {
            entity: E::ENTITY,
            field: name.to_string(),
        })
}

/// Read a field by name.
pub fn get<E: Filterable>(entity: &E, name: &str) -> Result<FieldValue, FilterError> {
    Ok(resolve::<E>(name)?.get(entity))
}

/// Write a field by name. Does not guard the identity field.
pub fn set<E: Filterable>(entity: &mut E, name: &str, value: FieldValue) -> Result<(), FilterError> {
    let field = resolve::<E>(name)?;
    field.set(entity, value).map_err(|e| match e {
        FieldError::Parse { expected, raw } => FilterError::TypeMismatch {
            field: name.to_string(),
            expected,
            value: raw,
        },
        FieldError::Mismatch { expected, found } => FilterError::TypeMismatch {
            field: name.to_string(),
            expected,
            value: found.to_string(),
        },
        FieldError::UnexpectedNull { expected } => FilterError::TypeMismatch {
            field: name.to_string(),
            expected,
            value: "null".into(),
        },
    })
}
