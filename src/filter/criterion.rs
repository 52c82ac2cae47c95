//! Filter criteria as sent by clients in the `filters` query parameter.

use crate::error::FilterError;
use crate::filter::Operator;
use serde::{Deserialize, Deserializer, Serialize};

/// One filter condition. `value: None` is the JSON `null` operand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(rename = "Property")]
    pub property: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Value", default, deserialize_with = "operand_text")]
    pub value: Option<String>,
}

impl Criterion {
    pub fn new(property: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Criterion {
            property: property.into(),
            operator,
            value: Some(value.into()),
        }
    }

    pub fn null(property: impl Into<String>, operator: Operator) -> Self {
        Criterion {
            property: property.into(),
            operator,
            value: None,
        }
    }
}

/// Accept numbers and booleans as their text form; the operand is always
/// reparsed into the field's type later.
fn operand_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "Value must be a string, number, boolean or null, got {}",
            other
        ))),
    }
}

/// Parse the raw `filters` text. Absent or empty text means no filtering.
pub fn parse_criteria(text: Option<&str>) -> Result<Vec<Criterion>, FilterError> {
    match text {
        None => Ok(Vec::new()),
        Some(t) if t.is_empty() => Ok(Vec::new()),
        Some(t) => serde_json::from_str(t).map_err(|e| FilterError::MalformedFilter(e.to_string())),
    }
}
