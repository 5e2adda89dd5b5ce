//! Forecast accuracy metrics

/// Mean absolute error between actual and predicted values
///
/// Returns `f64::NAN` when the slices are empty or differ in length;
/// callers that need a hard failure should validate lengths first.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

/// Mean absolute percentage error, in percent
///
/// Rows where the actual value is zero are excluded; the percentage
/// error is undefined there. Returns `None` when no rows remain (all
/// actuals zero, empty input, or mismatched lengths).
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for (a, p) in actual.iter().zip(predicted.iter()) {
        if *a != 0.0 {
            sum += ((a - p) / a).abs();
            count += 1;
        }
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f64 * 100.0)
    }
}

/// Root mean squared error between actual and predicted values
///
/// Returns `f64::NAN` when the slices are empty or differ in length.
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }

    let mse: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;

    mse.sqrt()
}

/// Coefficient of determination (R²)
///
/// Returns 0.0 when the actual values have no variance, so a constant
/// series never divides by zero. Returns `f64::NAN` for empty or
/// mismatched input.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}
