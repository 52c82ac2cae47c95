//! Router assembly: common routes at the root, entity routes under `/api`.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use crate::state::AppState;
use crate::store::EntityStore;
use axum::Router;

pub fn build_router<S: EntityStore>(state: AppState<S>) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api", entity_routes(state))
}
