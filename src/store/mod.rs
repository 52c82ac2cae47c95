//! Entity persistence behind a single trait, generic over entity type.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::filter::Filter;
use crate::schema::{Entity, FieldValue};
use async_trait::async_trait;

/// Add / remove / query / save for every [`Entity`] type. Mutating calls return
/// the number of affected rows.
#[async_trait]
pub trait EntityStore: Clone + Send + Sync + 'static {
    /// All rows of `E` matching `filter`. Implementations may evaluate part of
    /// the filter at the source; the result must equal in-memory evaluation.
    async fn query<E: Entity>(&self, filter: &Filter<E>) -> Result<Vec<E>, AppError>;

    async fn find_by_id<E: Entity>(&self, id: &FieldValue) -> Result<Option<E>, AppError>;

    /// Insert a new row. A duplicate identity is a conflict.
    async fn add<E: Entity>(&self, entity: E) -> Result<u64, AppError>;

    async fn remove<E: Entity>(&self, entity: &E) -> Result<u64, AppError>;

    /// Persist every field of an existing row, matched by identity.
    async fn save<E: Entity>(&self, entity: &E) -> Result<u64, AppError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
