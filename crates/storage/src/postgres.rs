use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::{debug, info};

use crate::{PredictionLog, PredictionRecord, StorageError};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS predicciones (
        id SERIAL PRIMARY KEY,
        datos_entrada JSONB,
        venta_predicha FLOAT,
        fecha TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )";

const INSERT_PREDICTION: &str = "
    INSERT INTO predicciones (datos_entrada, venta_predicha)
    VALUES ($1, $2)
    RETURNING id, datos_entrada, venta_predicha, fecha";

const SELECT_RECENT: &str = "
    SELECT id, datos_entrada, venta_predicha, fecha
    FROM predicciones
    ORDER BY fecha DESC, id DESC
    LIMIT $1";

/// Connection pool sizing
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL prediction log.
///
/// Each operation checks out one pooled connection for its own duration; the
/// connection goes back to the pool when the guard drops, whichever way the
/// call returns.
#[derive(Clone)]
pub struct PgPredictionLog {
    pool: PgPool,
}

impl PgPredictionLog {
    /// Build a pool without connecting, so the service can start while the
    /// database is still down.
    pub fn connect_lazy(database_url: &str, settings: &PoolSettings) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl PredictionLog for PgPredictionLog {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(CREATE_TABLE).execute(&mut *conn).await?;
        info!("prediction log table verified");
        Ok(())
    }

    async fn append(
        &self,
        payload: &serde_json::Value,
        amount: f64,
    ) -> Result<PredictionRecord, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let record = sqlx::query_as::<_, PredictionRecord>(INSERT_PREDICTION)
            .bind(Json(payload))
            .bind(amount)
            .fetch_one(&mut *conn)
            .await?;
        debug!(id = record.id, "prediction logged");
        Ok(record)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<PredictionRecord>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let records = sqlx::query_as::<_, PredictionRecord>(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await?;
        Ok(records)
    }
}
