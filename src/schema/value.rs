//! Runtime field values and the conversions between them and entity field types.

use crate::error::FieldError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declared type of an entity field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Boolean,
    Uuid,
    Timestamp,
}

impl FieldType {
    /// Whether GreaterThan / LessThan and friends apply.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Integer | FieldType::Decimal | FieldType::Timestamp
        )
    }

    /// Parse the textual form of a comparison operand into this type.
    pub fn parse(self, raw: &str) -> Result<FieldValue, FieldError> {
        let err = || FieldError::Parse {
            expected: self,
            raw: raw.to_string(),
        };
        Ok(match self {
            FieldType::Text => FieldValue::Text(raw.to_string()),
            FieldType::Integer => FieldValue::Integer(raw.trim().parse().map_err(|_| err())?),
            FieldType::Decimal => {
                FieldValue::Decimal(Decimal::from_str(raw.trim()).map_err(|_| err())?)
            }
            FieldType::Boolean => {
                let s = raw.trim();
                if s.eq_ignore_ascii_case("true") {
                    FieldValue::Boolean(true)
                } else if s.eq_ignore_ascii_case("false") {
                    FieldValue::Boolean(false)
                } else {
                    return Err(err());
                }
            }
            FieldType::Uuid => FieldValue::Uuid(Uuid::parse_str(raw.trim()).map_err(|_| err())?),
            FieldType::Timestamp => FieldValue::Timestamp(parse_timestamp(raw.trim()).ok_or_else(err)?),
        })
    }
}

/// RFC 3339, or a bare date taken as midnight UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Uuid => "uuid",
            FieldType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A field's value read out of an entity, or a parsed comparison operand.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// `None` for null.
    pub fn field_type(&self) -> Option<FieldType> {
        Some(match self {
            FieldValue::Null => return None,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Decimal(_) => FieldType::Decimal,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Uuid(_) => FieldType::Uuid,
            FieldValue::Timestamp(_) => FieldType::Timestamp,
        })
    }

    /// Typed ordering between two values of the same ordered type.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Uuid(u) => write!(f, "{}", u),
            FieldValue::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

/// Rust types that can back an entity field.
pub trait FieldData: Sized {
    const TYPE: FieldType;
    const NULLABLE: bool = false;

    fn to_value(&self) -> FieldValue;

    fn from_value(value: FieldValue) -> Result<Self, FieldError>;
}

macro_rules! impl_field_data {
    ($ty:ty, $variant:ident) => {
        impl FieldData for $ty {
            const TYPE: FieldType = FieldType::$variant;

            fn to_value(&self) -> FieldValue {
                FieldValue::$variant(self.clone())
            }

            fn from_value(value: FieldValue) -> Result<Self, FieldError> {
                match value {
                    FieldValue::$variant(v) => Ok(v),
                    FieldValue::Null => Err(FieldError::UnexpectedNull {
                        expected: FieldType::$variant,
                    }),
                    other => Err(FieldError::Mismatch {
                        expected: FieldType::$variant,
                        // non-null values always have a type
                        found: other.field_type().unwrap_or(FieldType::$variant),
                    }),
                }
            }
        }
    };
}

impl_field_data!(String, Text);
impl_field_data!(i64, Integer);
impl_field_data!(Decimal, Decimal);
impl_field_data!(bool, Boolean);
impl_field_data!(Uuid, Uuid);
impl_field_data!(DateTime<Utc>, Timestamp);

impl<T: FieldData> FieldData for Option<T> {
    const TYPE: FieldType = T::TYPE;
    const NULLABLE: bool = true;

    fn to_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_value(),
            None => FieldValue::Null,
        }
    }

    fn from_value(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}
