//! Entity CRUD handlers, generic over entity type and store.

use crate::error::AppError;
use crate::filter::{parse_criteria, Filter};
use crate::response;
use crate::schema::{Entity, FieldValue};
use crate::state::AppState;
use crate::store::EntityStore;
use crate::update::apply_update;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// URL-encoded JSON array of criteria.
    pub filters: Option<String>,
}

/// Parse a path id into the identity field's type.
fn parse_id<E: Entity>(raw: &str) -> Result<FieldValue, AppError> {
    let key = E::identity_field();
    key.ty().parse(raw).map_err(|e| {
        AppError::BadRequest(format!("invalid {} '{}': {}", key.name(), raw, e))
    })
}

/// Unwrap a JSON body, reporting rejections through the error envelope.
fn json_body<E>(payload: Result<Json<E>, JsonRejection>) -> Result<E, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn not_found<E: Entity>(id: &str) -> AppError {
    AppError::NotFound(format!("{} '{}'", E::ENTITY, id))
}

pub async fn list<E: Entity, S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<E>>, AppError> {
    let criteria = parse_criteria(params.filters.as_deref())?;
    let filter = Filter::<E>::compile(&criteria)?;
    let rows = state.store.query(&filter).await?;
    tracing::debug!(entity = E::ENTITY, rows = rows.len(), "list");
    Ok(Json(rows))
}

pub async fn create<E: Entity, S: EntityStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<E>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let count = state.store.add(body).await?;
    Ok(response::affected(count))
}

pub async fn read<E: Entity, S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id::<E>(&id_str)?;
    let row: Option<E> = state.store.find_by_id(&id).await?;
    Ok(response::optional(row))
}

pub async fn update<E: Entity, S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id_str): Path<String>,
    payload: Result<Json<E>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id::<E>(&id_str)?;
    let body = json_body(payload)?;
    let key = E::identity_field();
    let body_id = body.identity();
    if body_id != id {
        return Err(AppError::IdentityMismatch {
            field: key.name(),
            path: id_str,
            body: body_id.to_string(),
        });
    }
    let mut current: E = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found::<E>(&id_str))?;
    apply_update(&mut current, &body, key.name())?;
    let count = state.store.save(&current).await?;
    if count == 0 {
        return Err(not_found::<E>(&id_str));
    }
    Ok(response::affected(count))
}

pub async fn delete<E: Entity, S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id::<E>(&id_str)?;
    let current: E = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found::<E>(&id_str))?;
    let count = state.store.remove(&current).await?;
    if count == 0 {
        return Err(not_found::<E>(&id_str));
    }
    Ok(response::affected(count))
}
