//! Business impact of forecast error under simulated inventory
//! policies
//!
//! Two stocking policies run over the same evaluation window: the
//! naive policy stocks exactly the forecast, the safety-margin policy
//! stocks the forecast plus a configured margin. Over-stock pays the
//! holding cost per unit, under-stock pays the stockout cost per unit
//! of missed demand.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CostParams;
use crate::error::{ForecastError, Result};
use crate::metrics::{mean_absolute_error, mean_absolute_percentage_error};

/// Simulated cost of one stocking policy across the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyCost {
    /// Holding cost of units stocked but not sold
    pub excess_cost: f64,
    /// Lost-sale cost of demand that found no stock
    pub stockout_cost: f64,
}

impl PolicyCost {
    /// Combined cost of the policy
    pub fn total(&self) -> f64 {
        self.excess_cost + self.stockout_cost
    }
}

/// Error metrics and simulated inventory costs for one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Days in the evaluation window
    pub rows: usize,
    /// Mean absolute error of the forecast, in units
    pub mae: f64,
    /// Mean absolute percentage error; `None` when every actual value
    /// is zero
    pub mape: Option<f64>,
    /// Cost of stocking exactly the forecast
    pub naive: PolicyCost,
    /// Cost of stocking the forecast plus the safety margin
    pub optimized: PolicyCost,
    /// Naive cost minus optimized cost; negative when the margin hurts
    pub savings: f64,
    /// Savings as a percentage of the naive cost; 0 when the naive
    /// policy already costs nothing
    pub reduction_pct: f64,
    /// Cost parameters the simulation ran with
    pub params: CostParams,
}

/// Translates actual-vs-predicted demand into inventory cost impact
#[derive(Debug, Clone, Default)]
pub struct BusinessImpactCalculator {
    params: CostParams,
}

impl BusinessImpactCalculator {
    /// Create a calculator with explicit cost parameters
    pub fn new(params: CostParams) -> Self {
        Self { params }
    }

    /// Compare the naive and safety-margin policies over a window
    ///
    /// `actual` and `predicted` must be the same non-zero length and
    /// aligned by day.
    pub fn calculate(&self, actual: &[f64], predicted: &[f64]) -> Result<ImpactReport> {
        if actual.len() != predicted.len() || actual.is_empty() {
            return Err(ForecastError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }

        let mae = mean_absolute_error(actual, predicted);
        let mape = mean_absolute_percentage_error(actual, predicted);

        let naive = self.policy_cost(actual, predicted, 0.0);
        let optimized = self.policy_cost(actual, predicted, self.params.safety_margin);

        let savings = naive.total() - optimized.total();
        let reduction_pct = if naive.total() > 0.0 {
            savings / naive.total() * 100.0
        } else {
            0.0
        };

        debug!(
            rows = actual.len(),
            naive_cost = naive.total(),
            optimized_cost = optimized.total(),
            "simulated inventory policies"
        );

        Ok(ImpactReport {
            rows: actual.len(),
            mae,
            mape,
            naive,
            optimized,
            savings,
            reduction_pct,
            params: self.params,
        })
    }

    /// Cost of stocking `prediction * (1 + margin)` each day
    fn policy_cost(&self, actual: &[f64], predicted: &[f64], margin: f64) -> PolicyCost {
        let mut excess_units = 0.0;
        let mut stockout_units = 0.0;
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            let stocked = p * (1.0 + margin);
            excess_units += (stocked - a).max(0.0);
            stockout_units += (a - stocked).max(0.0);
        }

        PolicyCost {
            excess_cost: excess_units * self.params.holding_cost,
            stockout_cost: stockout_units * self.params.stockout_cost,
        }
    }
}

impl std::fmt::Display for ImpactReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Demand Forecast Impact Report")?;
        writeln!(f, "=============================")?;
        writeln!(f, "Forecast accuracy over {} days:", self.rows)?;
        writeln!(f, "  MAE:   {:.1} units", self.mae)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:  {:.1}%", mape)?,
            None => writeln!(f, "  MAPE:  n/a (no nonzero actuals)")?,
        }
        writeln!(f)?;
        writeln!(f, "Simulated inventory cost:")?;
        writeln!(
            f,
            "  Stock = forecast:        {:>12.2}",
            self.naive.total()
        )?;
        writeln!(
            f,
            "  Stock = forecast +{:.0}%:   {:>12.2}",
            self.params.safety_margin * 100.0,
            self.optimized.total()
        )?;
        writeln!(
            f,
            "  Savings:                 {:>12.2}  ({:.1}% of naive cost)",
            self.savings, self.reduction_pct
        )?;
        writeln!(f)?;
        writeln!(f, "Cost breakdown (naive -> with margin):")?;
        writeln!(
            f,
            "  Excess stock:   {:>12.2} -> {:>12.2}  ({})",
            self.naive.excess_cost,
            self.optimized.excess_cost,
            change_label(self.naive.excess_cost, self.optimized.excess_cost)
        )?;
        writeln!(
            f,
            "  Stockouts:      {:>12.2} -> {:>12.2}  ({})",
            self.naive.stockout_cost,
            self.optimized.stockout_cost,
            change_label(self.naive.stockout_cost, self.optimized.stockout_cost)
        )?;
        Ok(())
    }
}

/// Relative change of a cost category, or "n/a" from a zero base
fn change_label(before: f64, after: f64) -> String {
    if before > 0.0 {
        format!("{:+.1}%", (after - before) / before * 100.0)
    } else {
        "n/a".to_string()
    }
}
