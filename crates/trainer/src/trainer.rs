//! Encoder fitting and ordinary least squares
//!
//! Fits one label encoder per categorical column, encodes the whole dataset
//! with them and regresses the amount on the encoded features. The intercept
//! comes from centering; the slopes are the minimum-norm least squares
//! solution from an SVD, so a constant column gets a zero coefficient and
//! exactly collinear columns share their weight instead of failing the fit.

use anyhow::{anyhow, Context, Result};
use choco_model::{CategoricalColumn, EncoderSet, LabelEncoder, LinearModel, FEATURE_COUNT};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::dataset::SalesDataset;

/// Fitted model and the encoders it was trained under
#[derive(Clone, Debug)]
pub struct TrainedArtifacts {
    pub model: LinearModel,
    pub encoders: EncoderSet,
}

/// Linear regression trainer for sales amounts
#[derive(Debug, Default)]
pub struct SalesTrainer;

impl SalesTrainer {
    pub fn new() -> Self {
        Self
    }

    /// Fit encoders and the model on a cleaned dataset
    pub fn train(&self, dataset: &SalesDataset) -> Result<TrainedArtifacts> {
        let encoders = self.fit_encoders(dataset)?;
        let (features, targets) = self.design_matrix(dataset, &encoders)?;

        info!(
            "Fitting least squares on {} rows x {} features",
            features.nrows(),
            features.ncols()
        );
        let (coefficients, intercept) =
            least_squares(features, &targets).context("least squares fit failed")?;
        let model = LinearModel::new(coefficients, intercept, dataset.len())?;

        Ok(TrainedArtifacts { model, encoders })
    }

    /// One fresh encoder per categorical column
    fn fit_encoders(&self, dataset: &SalesDataset) -> Result<EncoderSet> {
        let mut encoders = EncoderSet::new();
        for column in CategoricalColumn::ALL {
            let encoder = LabelEncoder::fit(column.name(), dataset.column(column))?;
            debug!("{}: {} classes", column.name(), encoder.len());
            encoders.insert(column, encoder);
        }
        Ok(encoders)
    }

    /// Encode every row with the freshly fitted encoders
    fn design_matrix(
        &self,
        dataset: &SalesDataset,
        encoders: &EncoderSet,
    ) -> Result<(DMatrix<f64>, DVector<f64>)> {
        let mut flat = Vec::with_capacity(dataset.len() * FEATURE_COUNT);
        let mut targets = Vec::with_capacity(dataset.len());

        for record in &dataset.records {
            let encoded = encoders.encode(&record.order)?;
            // encoders were fitted on these very rows
            debug_assert!(encoded.fallbacks.is_empty());
            flat.extend_from_slice(encoded.features.as_slice());
            targets.push(record.amount);
        }

        let features = DMatrix::from_row_slice(dataset.len(), FEATURE_COUNT, &flat);
        Ok((features, DVector::from_vec(targets)))
    }
}

const RANK_TOLERANCE: f64 = 1e-10;

/// Minimum-norm OLS with intercept: returns `(coefficients, intercept)`
fn least_squares(mut features: DMatrix<f64>, targets: &DVector<f64>) -> Result<(Vec<f64>, f64)> {
    let means: Vec<f64> = features.column_iter().map(|column| column.mean()).collect();
    for (mut column, mean) in features.column_iter_mut().zip(&means) {
        column.add_scalar_mut(-mean);
    }
    let target_mean = targets.mean();
    let centered_targets = targets.add_scalar(-target_mean);

    let cols = features.ncols();
    let svd = features.svd(true, true);
    // relative cutoff for numerically zero singular values
    let tolerance = svd.singular_values.max() * RANK_TOLERANCE;
    let rank = svd.rank(tolerance);
    if rank < cols {
        debug!("design matrix has rank {} of {}", rank, cols);
    }

    let slopes = svd
        .solve(&centered_targets, tolerance)
        .map_err(|err| anyhow!(err))?;
    let intercept = target_mean - slopes.dot(&DVector::from_vec(means));

    Ok((slopes.iter().copied().collect(), intercept))
}
