//! Bootstrap-aggregated regression forest

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ForestParams;

use super::tree::RegressionTree;

/// Random forest regressor: the mean of independently grown CART trees
///
/// Tree `i` seeds its bootstrap resample and feature subsampling from
/// `params.seed + i`, so a fit is reproducible for a given parameter
/// set regardless of thread scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RandomForest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Fit a forest on a feature matrix and target vector
    ///
    /// Rows must be non-empty and rectangular; the training entry
    /// point validates that before calling in.
    pub(crate) fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Self {
        let n_rows = y.len();
        let n_features = x.first().map(|row| row.len()).unwrap_or(0);

        let fitted: Vec<(RegressionTree, Vec<f64>)> = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = params.seed.wrapping_add(i as u64);
                let indices = if params.bootstrap {
                    bootstrap_indices(n_rows, tree_seed)
                } else {
                    (0..n_rows).collect()
                };
                RegressionTree::fit(x, y, indices, params, tree_seed)
            })
            .collect();

        let mut trees = Vec::with_capacity(fitted.len());
        let mut feature_importances = vec![0.0; n_features];
        for (tree, importances) in fitted {
            trees.push(tree);
            for (total, part) in feature_importances.iter_mut().zip(importances) {
                *total += part;
            }
        }

        let sum: f64 = feature_importances.iter().sum();
        if sum > 0.0 {
            for importance in &mut feature_importances {
                *importance /= sum;
            }
        }

        Self {
            params: params.clone(),
            trees,
            feature_importances,
        }
    }

    /// Predict the target for one feature row
    pub(crate) fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict the target for many rows in parallel
    pub(crate) fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.par_iter().map(|row| self.predict_row(row)).collect()
    }

    /// Number of fitted trees
    pub(crate) fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Normalized per-feature SSE reductions, summing to 1 when any
    /// split happened
    pub(crate) fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Hyperparameters the forest was fitted with
    pub(crate) fn params(&self) -> &ForestParams {
        &self.params
    }
}

fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_sine() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..200)
            .map(|i| vec![i as f64 / 20.0, (i as f64 / 10.0).sin()])
            .collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, row)| row[0] + 2.0 * row[1] + 0.1 * (i % 5) as f64)
            .collect();
        (x, y)
    }

    #[test]
    fn same_seed_gives_identical_predictions() {
        let (x, y) = noisy_sine();
        let params = ForestParams {
            n_trees: 10,
            max_depth: 5,
            ..ForestParams::default()
        };

        let first = RandomForest::fit(&x, &y, &params);
        let second = RandomForest::fit(&x, &y, &params);

        assert_eq!(first.predict(&x), second.predict(&x));
    }

    #[test]
    fn different_seeds_disagree() {
        let (x, y) = noisy_sine();
        let base = ForestParams {
            n_trees: 10,
            max_depth: 5,
            ..ForestParams::default()
        };
        let other = ForestParams { seed: 7, ..base.clone() };

        let first = RandomForest::fit(&x, &y, &base);
        let second = RandomForest::fit(&x, &y, &other);

        assert_ne!(first.predict(&x), second.predict(&x));
    }

    #[test]
    fn fits_the_requested_number_of_trees() {
        let (x, y) = noisy_sine();
        let params = ForestParams {
            n_trees: 10,
            max_depth: 5,
            ..ForestParams::default()
        };

        let forest = RandomForest::fit(&x, &y, &params);
        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.feature_importances().len(), 2);
    }

    #[test]
    fn importances_are_normalized() {
        let (x, y) = noisy_sine();
        let params = ForestParams {
            n_trees: 5,
            max_depth: 5,
            ..ForestParams::default()
        };

        let forest = RandomForest::fit(&x, &y, &params);
        let sum: f64 = forest.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(forest.feature_importances().iter().all(|&v| v >= 0.0));
    }
}
