//! `entity!` declares a record type together with its static field registry.
//!
//! ```ignore
//! entity! {
//!     pub struct Product in "Product" {
//!         key product_id: Uuid as "ProductId",
//!         name: Option<String> as "Name",
//!         price: Decimal as "Price" = Decimal::from(5),
//!         country_name: String as "CountryName" => Country,
//!     }
//! }
//! ```
//!
//! `key` marks the identity field and must come first. `= expr` sets the value a
//! field takes when absent from a payload; `=> Target` marks a relation.

macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal {
            key $key:ident : $key_ty:ty as $key_name:literal,
            $( $field:ident : $ty:ty as $wire:literal $(= $default:expr)? $(=> $target:ident)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            #[serde(rename = $key_name)]
            pub $key: $key_ty,
            $(
                #[serde(rename = $wire)]
                pub $field: $ty,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    $key: ::core::default::Default::default(),
                    $( $field: $crate::schema::field_default!($($default)?), )*
                }
            }
        }

        impl $crate::schema::Filterable for $name {
            const ENTITY: &'static str = stringify!($name);

            fn fields() -> &'static [$crate::schema::Field<Self>] {
                static FIELDS: &[$crate::schema::Field<$name>] = &[
                    $crate::schema::Field {
                        name: $key_name,
                        ty: <$key_ty as $crate::schema::FieldData>::TYPE,
                        nullable: <$key_ty as $crate::schema::FieldData>::NULLABLE,
                        kind: $crate::schema::FieldKind::Identity,
                        getter: |e: &$name| $crate::schema::FieldData::to_value(&e.$key),
                        setter: |e: &mut $name, v: $crate::schema::FieldValue| {
                            e.$key = $crate::schema::FieldData::from_value(v)?;
                            Ok(())
                        },
                        copier: |t: &mut $name, s: &$name| t.$key = s.$key.clone(),
                    },
                    $(
                        $crate::schema::Field {
                            name: $wire,
                            ty: <$ty as $crate::schema::FieldData>::TYPE,
                            nullable: <$ty as $crate::schema::FieldData>::NULLABLE,
                            kind: $crate::schema::field_kind!($($target)?),
                            getter: |e: &$name| $crate::schema::FieldData::to_value(&e.$field),
                            setter: |e: &mut $name, v: $crate::schema::FieldValue| {
                                e.$field = $crate::schema::FieldData::from_value(v)?;
                                Ok(())
                            },
                            copier: |t: &mut $name, s: &$name| t.$field = s.$field.clone(),
                        },
                    )*
                ];
                FIELDS
            }

            fn field_index() -> &'static $crate::schema::FieldIndex {
                static INDEX: ::std::sync::OnceLock<$crate::schema::FieldIndex> =
                    ::std::sync::OnceLock::new();
                INDEX.get_or_init(|| {
                    $crate::schema::introspect::build_index(
                        stringify!($name),
                        <$name as $crate::schema::Filterable>::fields(),
                    )
                })
            }
        }

        impl $crate::schema::Entity for $name {
            const TABLE: &'static str = $table;

            fn identity_field() -> &'static $crate::schema::Field<Self> {
                &<$name as $crate::schema::Filterable>::fields()[0]
            }
        }
    };
}

macro_rules! field_default {
    () => {
        ::core::default::Default::default()
    };
    ($default:expr) => {
        $default
    };
}

macro_rules! field_kind {
    () => {
        $crate::schema::FieldKind::Scalar
    };
    ($target:ident) => {
        $crate::schema::FieldKind::Relation {
            target: <$target as $crate::schema::Filterable>::ENTITY,
        }
    };
}

pub(crate) use entity;
pub(crate) use field_default;
pub(crate) use field_kind;
