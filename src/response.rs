//! Response helpers for entity routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Affected-row count for add / update / delete.
pub fn affected(count: u64) -> (StatusCode, Json<u64>) {
    (StatusCode::OK, Json(count))
}

/// 200 with the entity, or 204 with an empty body when absent.
pub fn optional<T: Serialize>(entity: Option<T>) -> Response {
    match entity {
        Some(e) => (StatusCode::OK, Json(e)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
