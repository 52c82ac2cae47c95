//! Entity schema: field types and values, the per-type field registry, and the
//! storefront entities declared against it.

pub mod introspect;
mod macros;
pub mod model;
mod value;

pub use introspect::{resolve, FieldIndex};
pub use model::*;
pub use value::{FieldData, FieldType, FieldValue};

pub(crate) use macros::{entity, field_default, field_kind};

use crate::error::FieldError;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Role of a field within its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Primary key.
    Identity,
    Scalar,
    /// Foreign key to another entity type.
    Relation { target: &'static str },
}

/// Static descriptor for one declared field of `E`: name, type, and accessors.
pub struct Field<E> {
    pub(crate) name: &'static str,
    pub(crate) ty: FieldType,
    pub(crate) nullable: bool,
    pub(crate) kind: FieldKind,
    pub(crate) getter: fn(&E) -> FieldValue,
    pub(crate) setter: fn(&mut E, FieldValue) -> Result<(), FieldError>,
    pub(crate) copier: fn(&mut E, &E),
}

impl<E> Field<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> FieldType {
        self.ty
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_identity(&self) -> bool {
        self.kind == FieldKind::Identity
    }

    pub fn get(&self, entity: &E) -> FieldValue {
        (self.getter)(entity)
    }

    /// Write `value`, converting it into the field's Rust type.
    pub fn set(&self, entity: &mut E, value: FieldValue) -> Result<(), FieldError> {
        (self.setter)(entity, value)
    }

    /// Copy this field from `source` onto `target` without going through `FieldValue`.
    pub fn copy(&self, target: &mut E, source: &E) {
        (self.copier)(target, source)
    }
}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("nullable", &self.nullable)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Capability the filter engine and the introspector are written against.
pub trait Filterable: Sized + 'static {
    /// Entity type name, used in routes and error messages.
    const ENTITY: &'static str;

    /// Declared fields in declaration order; the identity field comes first.
    fn fields() -> &'static [Field<Self>];

    /// Name to position index over [`Filterable::fields`], built once per type.
    fn field_index() -> &'static FieldIndex;
}

/// A persisted record type served by the API.
pub trait Entity:
    Filterable + Clone + Default + Serialize + DeserializeOwned + Send + Sync + fmt::Debug
{
    /// Backing table name.
    const TABLE: &'static str;

    fn identity_field() -> &'static Field<Self>;

    fn identity(&self) -> FieldValue {
        Self::identity_field().get(self)
    }
}
