//! Demand model: training, prediction, and persistence
//!
//! [`train_model`] is a free function returning an explicit
//! [`TrainedDemandModel`]; prediction is a method on that handle, and
//! persistence lives in [`store`]. The handle owns the exact ordered
//! feature-column list it was fitted on and realigns every prediction
//! input to that order, so a reordered frame predicts identically.

mod forest;
mod tree;

pub mod store;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ForestParams;
use crate::error::{ForecastError, Result};
use crate::features::FeatureFrame;
use crate::metrics::r2_score;

use self::forest::RandomForest;

/// Fraction of rows, earliest first, used for fitting; the rest form
/// the held-out window. The split is temporal on purpose: lag and
/// rolling columns would leak future demand under a random split.
const TRAIN_FRACTION: f64 = 0.8;

/// Goodness-of-fit summary captured at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Rows in the fitting window
    pub train_rows: usize,
    /// Rows in the held-out window
    pub test_rows: usize,
    /// R² on the fitting window
    pub train_r2: f64,
    /// R² on the held-out window
    pub test_r2: f64,
}

/// How to treat expected feature columns absent from a prediction
/// input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingColumns {
    /// Synthesize the column as zeros; keeps older feature tables
    /// usable at the price of silently degraded predictions
    ZeroFill,
    /// Fail with a data format error naming the first missing column
    Reject,
}

/// A fitted forest plus the ordered feature columns it expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedDemandModel {
    forest: RandomForest,
    feature_columns: Vec<String>,
    fit: FitReport,
}

/// Train a demand forest on a feature table
///
/// Rows are split temporally: the first 80% fit the forest, the last
/// 20% score it. Fails when either side of the split would be empty.
pub fn train_model(
    frame: &FeatureFrame,
    target: &str,
    params: &ForestParams,
) -> Result<TrainedDemandModel> {
    if target == frame.date_column() {
        return Err(ForecastError::DataFormat(format!(
            "target column '{target}' is the date key"
        )));
    }

    let feature_columns: Vec<String> = frame
        .dataframe()
        .get_column_names()
        .into_iter()
        .filter(|name| *name != frame.date_column() && *name != target)
        .map(|name| name.to_string())
        .collect();
    if feature_columns.is_empty() {
        return Err(ForecastError::DataFormat(
            "feature table has no input columns besides the date and target".into(),
        ));
    }

    let y = frame.column_as_f64(target)?;
    let x = align_features(frame, &feature_columns, MissingColumns::Reject)?;

    let n = y.len();
    let split = (TRAIN_FRACTION * n as f64) as usize;
    if split == 0 || split == n {
        return Err(ForecastError::InsufficientData(format!(
            "{n} feature rows cannot form non-empty train and test windows"
        )));
    }

    let forest = RandomForest::fit(&x[..split], &y[..split], params);

    let train_pred = forest.predict(&x[..split]);
    let test_pred = forest.predict(&x[split..]);
    let fit = FitReport {
        train_rows: split,
        test_rows: n - split,
        train_r2: r2_score(&y[..split], &train_pred),
        test_r2: r2_score(&y[split..], &test_pred),
    };

    info!(
        trees = forest.n_trees(),
        train_rows = fit.train_rows,
        test_rows = fit.test_rows,
        train_r2 = fit.train_r2,
        test_r2 = fit.test_r2,
        "fitted demand forest"
    );

    Ok(TrainedDemandModel {
        forest,
        feature_columns,
        fit,
    })
}

impl TrainedDemandModel {
    /// Predict demand for each row of a feature table
    ///
    /// Columns are matched by name against the training schema, so
    /// column order in the input does not matter. Missing columns are
    /// zero-filled; use [`predict_strict`](Self::predict_strict) to
    /// reject them instead.
    pub fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>> {
        let x = align_features(frame, &self.feature_columns, MissingColumns::ZeroFill)?;
        Ok(self.forest.predict(&x))
    }

    /// Predict demand, failing when any training column is absent
    pub fn predict_strict(&self, frame: &FeatureFrame) -> Result<Vec<f64>> {
        let x = align_features(frame, &self.feature_columns, MissingColumns::Reject)?;
        Ok(self.forest.predict(&x))
    }

    /// The ordered feature columns the model was fitted on
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Fit quality captured at training time
    pub fn fit_report(&self) -> &FitReport {
        &self.fit
    }

    /// Hyperparameters the model was fitted with
    pub fn params(&self) -> &ForestParams {
        self.forest.params()
    }

    /// Feature names and normalized importances, most important first
    pub fn feature_importance_ranking(&self) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .feature_columns
            .iter()
            .cloned()
            .zip(self.forest.feature_importances().iter().copied())
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }
}

/// Assemble the row-major feature matrix in training-schema order
///
/// This is the single seam where missing-column handling happens;
/// everything downstream sees a rectangular matrix.
fn align_features(
    frame: &FeatureFrame,
    columns: &[String],
    missing: MissingColumns,
) -> Result<Vec<Vec<f64>>> {
    let rows = frame.len();
    let mut by_column: Vec<Vec<f64>> = Vec::with_capacity(columns.len());

    for name in columns {
        if frame.has_column(name) {
            let values = frame.column_as_f64(name)?;
            if values.len() != rows {
                return Err(ForecastError::DataFormat(format!(
                    "column '{name}' has {} non-null values for {rows} rows",
                    values.len()
                )));
            }
            by_column.push(values);
        } else {
            match missing {
                MissingColumns::ZeroFill => {
                    warn!(column = %name, "feature column missing, filling with zeros");
                    by_column.push(vec![0.0; rows]);
                }
                MissingColumns::Reject => {
                    return Err(ForecastError::DataFormat(format!(
                        "input is missing feature column '{name}'"
                    )));
                }
            }
        }
    }

    Ok((0..rows)
        .map(|row| by_column.iter().map(|col| col[row]).collect())
        .collect())
}
