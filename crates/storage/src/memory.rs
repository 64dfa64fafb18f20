use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{PredictionLog, PredictionRecord, StorageError};

/// In-memory prediction log with the same ordering rules as the table.
///
/// [`MemoryPredictionLog::set_available`] simulates an unreachable database.
#[derive(Clone)]
pub struct MemoryPredictionLog {
    records: Arc<RwLock<Vec<PredictionRecord>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryPredictionLog {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MemoryPredictionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

#[async_trait]
impl PredictionLog for MemoryPredictionLog {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.check_available()
    }

    async fn append(
        &self,
        payload: &serde_json::Value,
        amount: f64,
    ) -> Result<PredictionRecord, StorageError> {
        self.check_available()?;

        let mut records = self.records.write();
        let record = PredictionRecord {
            id: records.len() as i32 + 1,
            datos_entrada: payload.clone(),
            venta_predicha: amount,
            fecha: chrono::Utc::now().naive_utc(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<PredictionRecord>, StorageError> {
        self.check_available()?;

        let mut records = self.records.read().clone();
        records.sort_by(|a, b| b.fecha.cmp(&a.fecha).then(b.id.cmp(&a.id)));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }
}
