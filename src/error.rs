//! Typed errors and HTTP mapping.

use crate::filter::Operator;
use crate::schema::FieldType;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key} '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Reading or writing a single field value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("cannot parse '{raw}' as {expected}")]
    Parse { expected: FieldType, raw: String },
    #[error("expected {expected} value, found {found}")]
    Mismatch { expected: FieldType, found: FieldType },
    #[error("null is not allowed for {expected} field")]
    UnexpectedNull { expected: FieldType },
}

/// Raised while parsing, compiling or evaluating filter criteria.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("malformed filter: {0}")]
    MalformedFilter(String),
    #[error("unknown field '{field}' on {entity}")]
    UnknownField { entity: &'static str, field: String },
    #[error("value '{value}' for '{field}' is not a valid {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        value: String,
    },
    #[error("operator {operator} is not supported for {ty} field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: Operator,
        ty: FieldType,
    },
    #[error("operator {operator} cannot be applied to null on '{field}'")]
    NullOperand { field: String, operator: Operator },
}

impl FilterError {
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::MalformedFilter(_) => "malformed_filter",
            FilterError::UnknownField { .. } => "unknown_field",
            FilterError::TypeMismatch { .. } => "type_mismatch",
            FilterError::UnsupportedOperator { .. } => "unsupported_operator",
            FilterError::NullOperand { .. } => "null_operand",
        }
    }

    /// The offending criterion, for the error envelope.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            FilterError::MalformedFilter(_) => None,
            FilterError::UnknownField { entity, field } => Some(serde_json::json!({
                "entity": entity,
                "property": field,
            })),
            FilterError::TypeMismatch { field, value, .. } => Some(serde_json::json!({
                "property": field,
                "value": value,
            })),
            FilterError::UnsupportedOperator { field, operator, .. }
            | FilterError::NullOperand { field, operator } => Some(serde_json::json!({
                "property": field,
                "operator": operator,
            })),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("Mismatched {field}: path '{path}', body '{body}'")]
    IdentityMismatch {
        field: &'static str,
        path: String,
        body: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Filter(e) => (StatusCode::BAD_REQUEST, e.code()),
            AppError::IdentityMismatch { .. } => (StatusCode::BAD_REQUEST, "identity_mismatch"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_client_error() {
            tracing::warn!(code, error = %self, "request rejected");
        } else {
            tracing::error!(code, error = %self, "request failed");
        }
        let details = match &self {
            AppError::Filter(e) => e.details(),
            AppError::IdentityMismatch { field, path, body } => Some(serde_json::json!({
                "field": field,
                "path": path,
                "body": body,
            })),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
