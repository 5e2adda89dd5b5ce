//! Configuration for the pipeline components
//!
//! Every component receives its parameters explicitly at construction.
//! Nothing in the crate reads global state, so two configurations can
//! run side by side in one process.

use serde::{Deserialize, Serialize};

/// Lag offsets and rolling windows used by the feature builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Lag offsets in rows (days, for gap-free daily data)
    pub lags: Vec<usize>,
    /// Trailing rolling-mean window lengths in rows
    pub rolling_windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 7, 30],
            rolling_windows: vec![7, 30],
        }
    }
}

impl FeatureConfig {
    /// Rows at the start of the series that lack full lag or rolling
    /// history and are dropped from the feature table
    pub fn warmup_rows(&self) -> usize {
        let max_lag = self.lags.iter().copied().max().unwrap_or(0);
        let max_window = self.rolling_windows.iter().copied().max().unwrap_or(0);
        max_lag.max(max_window.saturating_sub(1))
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples required in each leaf
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all
    pub max_features: Option<usize>,
    /// Train each tree on a bootstrap resample of the training rows
    pub bootstrap: bool,
    /// Seed for bootstrap and feature subsampling; tree `i` derives
    /// its own stream from `seed + i`
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Unit costs for the simulated inventory policies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParams {
    /// Cost of holding one unit that was stocked but not sold
    pub holding_cost: f64,
    /// Cost of one unit of demand that found no stock
    pub stockout_cost: f64,
    /// Extra stock fraction for the safety-margin policy (0.10 = +10%)
    pub safety_margin: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            holding_cost: 5.0,
            stockout_cost: 15.0,
            safety_margin: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_warmup_covers_longest_lag() {
        assert_eq!(FeatureConfig::default().warmup_rows(), 30);
    }

    #[test]
    fn warmup_uses_window_minus_one() {
        let config = FeatureConfig {
            lags: vec![1, 2],
            rolling_windows: vec![7],
        };
        assert_eq!(config.warmup_rows(), 6);
    }

    #[test]
    fn warmup_is_zero_without_history_features() {
        let config = FeatureConfig {
            lags: vec![],
            rolling_windows: vec![],
        };
        assert_eq!(config.warmup_rows(), 0);
    }
}
