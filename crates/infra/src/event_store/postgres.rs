//! Postgres-backed metrics store.
//!
//! Each event is stored as one row in `metric_events`; the full serialized
//! record lives in the `payload` column and `event_type`/`occurred_at` are
//! duplicated for filtering. Insertion order is preserved through the `seq`
//! column.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database / PoolClosed / Io during insert | `Write` |
//! | Any error during a scan | `Read` |
//! | JSON decode of a stored row | `Serialization` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use cafeops_events::{EventType, MetricEvent};

use super::r#trait::{MetricsStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS metric_events (
    seq BIGSERIAL PRIMARY KEY,
    id UUID NOT NULL,
    event_type TEXT NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    payload JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS metric_events_type_idx ON metric_events (event_type, occurred_at);
"#;

/// Postgres limits a statement to 65535 bind parameters; four per row.
const MAX_ROWS_PER_STATEMENT: usize = 10_000;

#[derive(Debug, Clone)]
pub struct PostgresMetricsStore {
    pool: Arc<PgPool>,
}

impl PostgresMetricsStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e, StoreError::Write))?;
        Ok(())
    }

    fn decode_rows(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<MetricEvent>, StoreError> {
        rows.into_iter()
            .map(|row| {
                let payload: serde_json::Value = row
                    .try_get("payload")
                    .map_err(|e| StoreError::Read(e.to_string()))?;
                serde_json::from_value(payload).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl MetricsStore for PostgresMetricsStore {
    #[instrument(skip(self, events), fields(count = events.len()), err)]
    async fn insert_batch(&self, events: &[MetricEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut rows: Vec<(Uuid, &'static str, DateTime<Utc>, serde_json::Value)> =
            Vec::with_capacity(events.len());
        for event in events {
            let payload =
                serde_json::to_value(event).map_err(|e| StoreError::Serialization(e.to_string()))?;
            rows.push((Uuid::now_v7(), event.kind().as_str(), event.timestamp(), payload));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_batch", e, StoreError::Write))?;

        for part in rows.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO metric_events (id, event_type, occurred_at, payload) ",
            );
            builder.push_values(part, |mut b, (id, kind, at, payload)| {
                b.push_bind(*id)
                    .push_bind(*kind)
                    .push_bind(*at)
                    .push_bind(payload.clone());
            });
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_batch", e, StoreError::Write))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_batch", e, StoreError::Write))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn load_all(&self) -> Result<Vec<MetricEvent>, StoreError> {
        let rows = sqlx::query("SELECT payload FROM metric_events ORDER BY seq ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_all", e, StoreError::Read))?;
        Self::decode_rows(rows)
    }

    #[instrument(skip(self), err)]
    async fn load_by_types(&self, types: &[EventType]) -> Result<Vec<MetricEvent>, StoreError> {
        let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        let rows = sqlx::query(
            r#"
            SELECT payload
            FROM metric_events
            WHERE event_type = ANY($1)
            ORDER BY seq ASC
            "#,
        )
        .bind(&names)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_by_types", e, StoreError::Read))?;
        Self::decode_rows(rows)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error, wrap: fn(String) -> StoreError) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            wrap(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => wrap(format!("connection pool closed in {}", operation)),
        other => wrap(format!("{} failed: {}", operation, other)),
    }
}
