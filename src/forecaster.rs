//! Stateful forecasting façade
//!
//! Bundles train, predict, save, and load around one optional model
//! for callers that want the pipeline as a single object. The
//! stateless seams ([`train_model`](crate::model::train_model),
//! [`TrainedDemandModel`](crate::model::TrainedDemandModel), and
//! [`store`](crate::model::store)) stay usable on their own.

use std::path::Path;

use crate::config::ForestParams;
use crate::error::{ForecastError, Result};
use crate::features::FeatureFrame;
use crate::model::{self, store, FitReport, TrainedDemandModel};

/// Demand forecaster holding hyperparameters and, once trained or
/// loaded, the current model
#[derive(Debug, Default)]
pub struct DemandForecaster {
    params: ForestParams,
    model: Option<TrainedDemandModel>,
}

impl DemandForecaster {
    /// Create a forecaster with explicit hyperparameters
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            model: None,
        }
    }

    /// Train on a feature table, replacing any current model
    pub fn train(&mut self, frame: &FeatureFrame, target: &str) -> Result<FitReport> {
        let trained = model::train_model(frame, target, &self.params)?;
        let report = trained.fit_report().clone();
        self.model = Some(trained);
        Ok(report)
    }

    /// Predict demand for each row of a feature table
    ///
    /// Fails with [`ForecastError::ModelNotTrained`] before the first
    /// successful [`train`](Self::train) or [`load`](Self::load).
    pub fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>> {
        self.current()?.predict(frame)
    }

    /// Persist the current model to a path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        store::save_model(self.current()?, path)
    }

    /// Load a model artifact, replacing any current model
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.model = Some(store::load_model(path)?);
        Ok(())
    }

    /// The current model, if one was trained or loaded
    pub fn model(&self) -> Option<&TrainedDemandModel> {
        self.model.as_ref()
    }

    /// Hyperparameters used for the next training run
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    fn current(&self) -> Result<&TrainedDemandModel> {
        self.model.as_ref().ok_or(ForecastError::ModelNotTrained)
    }
}
