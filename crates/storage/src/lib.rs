//! Prediction log storage
//!
//! Every successful prediction is appended to the `predicciones` table; the
//! service reads back the most recent entries. The PostgreSQL backend works
//! on a connection pool, the in-memory backend serves tests.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

mod memory;
mod postgres;

pub use memory::MemoryPredictionLog;
pub use postgres::{PgPredictionLog, PoolSettings};

/// Number of entries returned by a history lookup
pub const HISTORY_LIMIT: i64 = 10;

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Prediction log unavailable")]
    Unavailable,
}

/// One stored prediction, serialized with the table's column names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PredictionRecord {
    pub id: i32,
    /// Request payload exactly as submitted
    pub datos_entrada: serde_json::Value,
    /// Unrounded model output
    pub venta_predicha: f64,
    pub fecha: NaiveDateTime,
}

/// Append-only prediction log
#[async_trait]
pub trait PredictionLog: Send + Sync {
    /// Create the log table if it does not exist
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Append one entry and return it as stored
    async fn append(
        &self,
        payload: &serde_json::Value,
        amount: f64,
    ) -> Result<PredictionRecord, StorageError>;

    /// Most recent entries first, at most `limit`
    async fn recent(&self, limit: i64) -> Result<Vec<PredictionRecord>, StorageError>;
}
