//! Entity CRUD routes: one resource per declared entity, path segment = entity name.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::schema::{Country, Customer, Dictionary, Entity, Order, OrderLine, OrderStatus, Product, Sales};
use crate::state::AppState;
use crate::store::EntityStore;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// `/<Entity>` and `/<Entity>/:id` for one entity type.
fn resource<E: Entity, S: EntityStore>() -> Router<AppState<S>> {
    let collection = format!("/{}", E::ENTITY);
    let item = format!("/{}/:id", E::ENTITY);
    Router::new()
        .route(&collection, get(list::<E, S>).post(create::<E, S>))
        .route(
            &item,
            get(read::<E, S>).put(update::<E, S>).delete(delete_handler::<E, S>),
        )
}

pub fn entity_routes<S: EntityStore>(state: AppState<S>) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .merge(resource::<Country, S>())
        .merge(resource::<Customer, S>())
        .merge(resource::<Dictionary, S>())
        .merge(resource::<Order, S>())
        .merge(resource::<OrderLine, S>())
        .merge(resource::<OrderStatus, S>())
        .merge(resource::<Product, S>())
        .merge(resource::<Sales, S>())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
