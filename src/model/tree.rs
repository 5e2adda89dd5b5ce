//! CART regression tree used inside the forest

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::ForestParams;

/// SSE below this is treated as a pure node
const MIN_SSE: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted regression tree
///
/// Thresholds are midpoints between adjacent distinct feature values
/// (clamped to the lower value when rounding lands on the upper one),
/// chosen by variance reduction. Rows with a feature value at or below
/// the threshold go left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit a tree on the rows named by `indices` (repeats allowed, so
    /// a bootstrap resample is just a resampled index list)
    ///
    /// Returns the tree and its un-normalized per-feature SSE
    /// reductions. `indices` must be non-empty and every row must have
    /// `n_features` values.
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        params: &ForestParams,
        seed: u64,
    ) -> (Self, Vec<f64>) {
        let n_features = x.first().map(|row| row.len()).unwrap_or(0);
        let mut importances = vec![0.0; n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let root = grow(x, y, indices, 0, params, &mut rng, &mut importances);
        (Self { root }, importances)
    }

    /// Predict the target for one feature row
    pub(crate) fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn grow(
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &ForestParams,
    rng: &mut ChaCha8Rng,
    importances: &mut [f64],
) -> Node {
    let (sum, sum_sq) = label_sums(y, &indices);
    let n = indices.len() as f64;
    let node_value = sum / n;
    let node_sse = sum_sq - sum * sum / n;

    if depth >= params.max_depth
        || indices.len() < params.min_samples_split
        || node_sse < MIN_SSE
    {
        return Node::Leaf { value: node_value };
    }

    let split = match best_split(x, y, &indices, node_sse, params, rng) {
        Some(split) => split,
        None => return Node::Leaf { value: node_value },
    };

    importances[split.feature] += split.gain;

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| x[i][split.feature] <= split.threshold);

    let left = grow(x, y, left_indices, depth + 1, params, rng, importances);
    let right = grow(x, y, right_indices, depth + 1, params, rng, importances);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Scan every candidate feature for the threshold with the largest SSE
/// reduction
///
/// Each feature is scanned once over its sorted node rows with running
/// sums, so a node costs O(features * n log n) rather than a partition
/// per candidate threshold.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    parent_sse: f64,
    params: &ForestParams,
    rng: &mut ChaCha8Rng,
) -> Option<BestSplit> {
    let n_features = x.first().map(|row| row.len()).unwrap_or(0);
    if n_features == 0 {
        return None;
    }

    let mut features: Vec<usize> = (0..n_features).collect();
    if let Some(k) = params.max_features {
        if k < n_features {
            features.shuffle(rng);
            features.truncate(k.max(1));
        }
    }

    let (total_sum, total_sum_sq) = label_sums(y, indices);
    let n = indices.len();

    let mut best: Option<BestSplit> = None;
    for &feature in &features {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sum_sq = 0.0;
        for pos in 0..n - 1 {
            let label = y[order[pos]];
            left_sum += label;
            left_sum_sq += label * label;

            let here = x[order[pos]][feature];
            let next = x[order[pos + 1]][feature];
            if here == next {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let left_sse = left_sum_sq - left_sum * left_sum / n_left as f64;
            let right_sum = total_sum - left_sum;
            let right_sum_sq = total_sum_sq - left_sum_sq;
            let right_sse = right_sum_sq - right_sum * right_sum / n_right as f64;

            let gain = parent_sse - (left_sse + right_sse);
            if gain > best.as_ref().map(|b| b.gain).unwrap_or(MIN_SSE) {
                // The midpoint of ulp-adjacent values rounds onto the
                // upper value and would leave the right side empty;
                // clamp to the lower value
                let mid = (here + next) / 2.0;
                best = Some(BestSplit {
                    feature,
                    threshold: if mid < next { mid } else { here },
                    gain,
                });
            }
        }
    }

    best
}

fn label_sums(y: &[f64], indices: &[usize]) -> (f64, f64) {
    indices.iter().fold((0.0, 0.0), |(sum, sum_sq), &i| {
        (sum + y[i], sum_sq + y[i] * y[i])
    })
}
