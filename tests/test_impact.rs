use assert_approx_eq::assert_approx_eq;
use demand_forecast::{BusinessImpactCalculator, CostParams, ForecastError, ImpactReport};
use pretty_assertions::assert_eq;

fn calculator() -> BusinessImpactCalculator {
    BusinessImpactCalculator::new(CostParams {
        holding_cost: 5.0,
        stockout_cost: 15.0,
        safety_margin: 0.10,
    })
}

#[test]
fn test_worked_single_day_example() {
    // One day, actual 10, forecast 20: naive over-stocks 10 units;
    // the margin policy stocks 22 and over-stocks 12
    let report = calculator().calculate(&[10.0], &[20.0]).unwrap();

    assert_approx_eq!(report.naive.excess_cost, 50.0, 1e-9);
    assert_approx_eq!(report.naive.stockout_cost, 0.0, 1e-9);
    assert_approx_eq!(report.optimized.excess_cost, 60.0, 1e-9);
    assert_approx_eq!(report.savings, -10.0, 1e-9);
    assert_approx_eq!(report.reduction_pct, -20.0, 1e-9);
}

#[test]
fn test_margin_converts_stockouts_to_cheaper_excess() {
    // Forecast slightly low: naive pays stockouts, the margin policy
    // clears them at the cheaper holding rate
    let report = calculator().calculate(&[100.0], &[95.0]).unwrap();

    assert_approx_eq!(report.naive.stockout_cost, 75.0, 1e-9);
    assert_approx_eq!(report.naive.excess_cost, 0.0, 1e-9);
    assert_approx_eq!(report.optimized.stockout_cost, 0.0, 1e-9);
    assert_approx_eq!(report.optimized.excess_cost, 22.5, 1e-9);
    assert_approx_eq!(report.savings, 52.5, 1e-9);
    assert_approx_eq!(report.reduction_pct, 70.0, 1e-9);
}

#[test]
fn test_perfect_forecast_reduction_is_zero_not_nan() {
    let report = calculator()
        .calculate(&[100.0, 100.0], &[100.0, 100.0])
        .unwrap();

    assert_eq!(report.mae, 0.0);
    assert_eq!(report.mape, Some(0.0));
    assert_eq!(report.naive.total(), 0.0);
    // The margin policy still buys extra stock it does not need
    assert_approx_eq!(report.optimized.excess_cost, 100.0, 1e-9);
    assert_approx_eq!(report.savings, -100.0, 1e-9);
    assert_eq!(report.reduction_pct, 0.0);
}

#[test]
fn test_mape_skips_zero_demand_days() {
    let report = calculator().calculate(&[0.0, 10.0], &[5.0, 20.0]).unwrap();

    assert_approx_eq!(report.mae, 7.5, 1e-9);
    assert_approx_eq!(report.mape.unwrap(), 100.0, 1e-9);
}

#[test]
fn test_mape_is_none_when_demand_is_all_zero() {
    let report = calculator().calculate(&[0.0, 0.0], &[10.0, 20.0]).unwrap();

    assert_eq!(report.mape, None);
    let text = report.to_string();
    assert!(text.contains("MAPE:  n/a"));
}

#[test]
fn test_length_mismatch_and_empty_input() {
    let err = calculator().calculate(&[1.0, 2.0], &[1.0]).unwrap_err();
    match err {
        ForecastError::DimensionMismatch { actual, predicted } => {
            assert_eq!(actual, 2);
            assert_eq!(predicted, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let empty = calculator().calculate(&[], &[]);
    assert!(matches!(
        empty,
        Err(ForecastError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_report_renders_every_section() {
    let report = calculator()
        .calculate(&[120.0, 80.0, 100.0], &[110.0, 90.0, 95.0])
        .unwrap();
    let text = report.to_string();

    assert!(text.contains("Demand Forecast Impact Report"));
    assert!(text.contains("MAE:"));
    assert!(text.contains("Stock = forecast"));
    assert!(text.contains("Savings:"));
    assert!(text.contains("Excess stock:"));
    assert!(text.contains("Stockouts:"));
}

#[test]
fn test_report_serializes_to_json_and_back() {
    let report = calculator()
        .calculate(&[120.0, 80.0], &[100.0, 90.0])
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let parsed: ImpactReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, report);
}

#[test]
fn test_costs_scale_with_parameters() {
    let cheap = BusinessImpactCalculator::new(CostParams {
        holding_cost: 1.0,
        stockout_cost: 3.0,
        safety_margin: 0.10,
    });
    let report = cheap.calculate(&[10.0], &[20.0]).unwrap();

    // Same 10 excess units as the worked example, at a fifth the rate
    assert_approx_eq!(report.naive.excess_cost, 10.0, 1e-9);
}
