//! PostgreSQL store. Tables are expected to exist with one column per declared
//! field, named as the field.

use crate::config::ServerConfig;
use crate::error::{AppError, ConfigError};
use crate::filter::Filter;
use crate::schema::{Entity, FieldType, FieldValue};
use crate::sql::{self, QueryBuf};
use crate::store::EntityStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    /// Connect using `DATABASE_URL` from the config.
    pub async fn connect(config: &ServerConfig) -> Result<Self, AppError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid {
                key: "DATABASE_URL",
                value: String::new(),
                reason: "required for the PostgreSQL store".into(),
            })?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        tracing::info!(schema = %config.db_schema, max_connections = config.max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool, config.db_schema.clone()))
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<PgRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let result = query.execute(&self.pool).await.map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(db.message().to_string()),
            other => AppError::Db(other),
        })?;
        Ok(result.rows_affected())
    }
}

/// Read one column as the field's declared type.
fn decode_column(row: &PgRow, name: &str, ty: FieldType) -> Result<FieldValue, sqlx::Error> {
    let value = match ty {
        FieldType::Text => row.try_get::<Option<String>, _>(name)?.map(FieldValue::Text),
        FieldType::Integer => row.try_get::<Option<i64>, _>(name)?.map(FieldValue::Integer),
        FieldType::Decimal => row.try_get::<Option<Decimal>, _>(name)?.map(FieldValue::Decimal),
        FieldType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(FieldValue::Boolean),
        FieldType::Uuid => row.try_get::<Option<uuid::Uuid>, _>(name)?.map(FieldValue::Uuid),
        FieldType::Timestamp => row
            .try_get::<Option<DateTime<Utc>>, _>(name)?
            .map(FieldValue::Timestamp),
    };
    Ok(value.unwrap_or(FieldValue::Null))
}

fn row_to_entity<E: Entity>(row: &PgRow) -> Result<E, AppError> {
    let mut entity = E::default();
    for field in E::fields() {
        let value = decode_column(row, field.name(), field.ty())?;
        field
            .set(&mut entity, value)
            .map_err(|e| AppError::Store(format!("{}.{}: {}", E::ENTITY, field.name(), e)))?;
    }
    Ok(entity)
}

#[async_trait]
impl EntityStore for PgStore {
    async fn query<E: Entity>(&self, filter: &Filter<E>) -> Result<Vec<E>, AppError> {
        let (pushed, residual) = filter.partition();
        let q = sql::select_list::<E>(&self.schema, &pushed);
        let rows = self.fetch_all(&q).await?;
        let entities = rows.iter().map(row_to_entity::<E>).collect::<Result<Vec<_>, _>>()?;
        if residual.is_empty() {
            return Ok(entities);
        }
        tracing::debug!(entity = E::ENTITY, residual = ?residual, "filtering in memory");
        Ok(residual.apply(entities)?)
    }

    async fn find_by_id<E: Entity>(&self, id: &FieldValue) -> Result<Option<E>, AppError> {
        let q = sql::select_by_id::<E>(&self.schema, id);
        let rows = self.fetch_all(&q).await?;
        rows.first().map(row_to_entity::<E>).transpose()
    }

    async fn add<E: Entity>(&self, entity: E) -> Result<u64, AppError> {
        self.execute(&sql::insert(&self.schema, &entity)).await
    }

    async fn remove<E: Entity>(&self, entity: &E) -> Result<u64, AppError> {
        self.execute(&sql::delete(&self.schema, entity)).await
    }

    async fn save<E: Entity>(&self, entity: &E) -> Result<u64, AppError> {
        self.execute(&sql::update(&self.schema, entity)).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
