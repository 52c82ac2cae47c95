//! Storefront API: CRUD REST backend with a generic filter engine and partial updates.

pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod sql;
pub mod state;
pub mod store;
pub mod update;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError, FieldError, FilterError};
pub use filter::{apply, parse_criteria, Criterion, Filter, Operator};
pub use routes::{build_router, common_routes, entity_routes};
pub use schema::{Entity, FieldType, FieldValue, Filterable};
pub use state::AppState;
pub use store::{EntityStore, MemoryStore, PgStore};
pub use update::apply_update;
