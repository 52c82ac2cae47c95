//! Comparison operators and their typed evaluation.

use crate::error::FilterError;
use crate::schema::{FieldType, FieldValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator tags, spelled exactly as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "Equal",
            Operator::NotEqual => "NotEqual",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThan => "LessThan",
            Operator::GreaterOrEqual => "GreaterOrEqual",
            Operator::LessOrEqual => "LessOrEqual",
            Operator::Contains => "Contains",
            Operator::StartsWith => "StartsWith",
            Operator::EndsWith => "EndsWith",
        }
    }

    /// Equal and NotEqual: the only operators that accept null.
    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan | Operator::LessThan | Operator::GreaterOrEqual | Operator::LessOrEqual
        )
    }

    pub fn is_text(self) -> bool {
        matches!(self, Operator::Contains | Operator::StartsWith | Operator::EndsWith)
    }

    /// Whether this operator can be applied to a field of type `ty`.
    pub fn supports(self, ty: FieldType) -> bool {
        if self.is_ordering() {
            ty.is_ordered()
        } else if self.is_text() {
            ty == FieldType::Text
        } else {
            true
        }
    }

    /// Evaluate `value <op> operand`. The operand must already be parsed into
    /// the field's type.
    pub fn evaluate(self, field: &str, value: &FieldValue, operand: &FieldValue) -> Result<bool, FilterError> {
        match self {
            Operator::Equal => return Ok(value == operand),
            Operator::NotEqual => return Ok(value != operand),
            _ => {}
        }
        if value.is_null() || operand.is_null() {
            return Err(FilterError::NullOperand {
                field: field.to_string(),
                operator: self,
            });
        }
        let unsupported = || FilterError::UnsupportedOperator {
            field: field.to_string(),
            operator: self,
            // checked non-null above
            ty: value.field_type().unwrap_or(FieldType::Text),
        };
        if self.is_ordering() {
            let ord = value.compare(operand).ok_or_else(unsupported)?;
            return Ok(match self {
                Operator::GreaterThan => ord.is_gt(),
                Operator::LessThan => ord.is_lt(),
                Operator::GreaterOrEqual => ord.is_ge(),
                _ => ord.is_le(),
            });
        }
        match (value, operand) {
            (FieldValue::Text(s), FieldValue::Text(needle)) => Ok(match self {
                Operator::Contains => s.contains(needle.as_str()),
                Operator::StartsWith => s.starts_with(needle.as_str()),
                _ => s.ends_with(needle.as_str()),
            }),
            _ => Err(unsupported()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
