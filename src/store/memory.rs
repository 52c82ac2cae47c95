//! In-process store: one insertion-ordered table per entity type.

use crate::error::AppError;
use crate::filter::Filter;
use crate::schema::{Entity, FieldValue};
use crate::store::EntityStore;
use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Tables = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<E: Entity, R>(&self, f: impl FnOnce(&[E]) -> R) -> Result<R, AppError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        match tables.get(&TypeId::of::<E>()) {
            Some(table) => {
                let rows = table
                    .downcast_ref::<Vec<E>>()
                    .ok_or_else(|| AppError::Store(format!("table type mismatch for {}", E::ENTITY)))?;
                Ok(f(rows))
            }
            None => Ok(f(&[])),
        }
    }

    fn write<E: Entity, R>(&self, f: impl FnOnce(&mut Vec<E>) -> R) -> Result<R, AppError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))?;
        let rows = tables
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<E>::new()))
            .downcast_mut::<Vec<E>>()
            .ok_or_else(|| AppError::Store(format!("table type mismatch for {}", E::ENTITY)))?;
        Ok(f(rows))
    }
}

fn position<E: Entity>(rows: &[E], id: &FieldValue) -> Option<usize> {
    rows.iter().position(|row| row.identity() == *id)
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn query<E: Entity>(&self, filter: &Filter<E>) -> Result<Vec<E>, AppError> {
        let rows = self.read::<E, _>(|rows| {
            let mut out = Vec::new();
            for row in rows {
                if filter.matches(row)? {
                    out.push(row.clone());
                }
            }
            Ok::<_, crate::error::FilterError>(out)
        })??;
        tracing::debug!(entity = E::ENTITY, rows = rows.len(), "memory query");
        Ok(rows)
    }

    async fn find_by_id<E: Entity>(&self, id: &FieldValue) -> Result<Option<E>, AppError> {
        self.read::<E, _>(|rows| position(rows, id).map(|i| rows[i].clone()))
    }

    async fn add<E: Entity>(&self, entity: E) -> Result<u64, AppError> {
        let id = entity.identity();
        self.write::<E, _>(|rows| {
            if position(rows, &id).is_some() {
                return Err(AppError::Conflict(format!(
                    "{} with {} '{}' already exists",
                    E::ENTITY,
                    E::identity_field().name(),
                    id
                )));
            }
            rows.push(entity);
            Ok(1)
        })?
    }

    async fn remove<E: Entity>(&self, entity: &E) -> Result<u64, AppError> {
        let id = entity.identity();
        self.write::<E, _>(|rows| match position(rows, &id) {
            Some(i) => {
                rows.remove(i);
                1
            }
            None => 0,
        })
    }

    async fn save<E: Entity>(&self, entity: &E) -> Result<u64, AppError> {
        let id = entity.identity();
        self.write::<E, _>(|rows| match position(rows, &id) {
            Some(i) => {
                rows[i] = entity.clone();
                1
            }
            None => 0,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.tables
            .read()
            .map(|_| ())
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))
    }
}
