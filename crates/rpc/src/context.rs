//! Process-wide prediction context
//!
//! Built once during startup from the loaded artifacts and shared read-only
//! by every request; nothing in here is mutated after construction.

use choco_model::{round_score, CategoricalColumn, EncoderSet, LinearModel, LoadedArtifacts};
use choco_storage::{PredictionLog, PredictionRecord, HISTORY_LIMIT};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::request::PredictRequest;

/// Outcome of one successful prediction
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Amount rounded to cents, as returned to clients
    pub score: f64,
    /// Unrounded model output, as logged
    pub amount: f64,
    pub record_id: i32,
    /// Columns whose value was unseen and replaced by the fallback class
    pub fallbacks: Vec<CategoricalColumn>,
}

pub struct AppContext {
    model: LinearModel,
    encoders: EncoderSet,
    model_hash: String,
    log: Arc<dyn PredictionLog>,
    started_at: Instant,
}

impl AppContext {
    pub fn new(artifacts: LoadedArtifacts, log: Arc<dyn PredictionLog>) -> Self {
        Self {
            model: artifacts.model,
            encoders: artifacts.encoders,
            model_hash: artifacts.model_hash,
            log,
            started_at: Instant::now(),
        }
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn model_hash(&self) -> &str {
        &self.model_hash
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Encode, evaluate, then log the raw payload with the result.
    ///
    /// The log insert is the last step: a failure before it writes nothing,
    /// and a failed insert fails the whole request.
    pub async fn predict(&self, payload: &serde_json::Value) -> Result<Prediction, ServiceError> {
        let order = PredictRequest::from_payload(payload)?.into_order()?;

        let encoded = self.encoders.encode(&order)?;
        for column in &encoded.fallbacks {
            let fallback = self.encoders.get(*column)?.fallback_class();
            warn!(
                "unseen {} {:?}, substituting {:?}",
                column.name(),
                order.category(*column),
                fallback
            );
        }

        let amount = self.model.predict(&encoded.features);
        let record = self.log.append(payload, amount).await?;
        info!(id = record.id, amount, "prediction stored");

        Ok(Prediction {
            score: round_score(amount),
            amount,
            record_id: record.id,
            fallbacks: encoded.fallbacks,
        })
    }

    /// Latest logged predictions, newest first
    pub async fn history(&self) -> Result<Vec<PredictionRecord>, ServiceError> {
        Ok(self.log.recent(HISTORY_LIMIT).await?)
    }
}
