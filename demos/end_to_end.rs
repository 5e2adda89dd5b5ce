use chrono::NaiveDate;
use demand_forecast::{synthetic, BusinessImpactCalculator, DemandForecaster, FeatureBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: End-to-End Example");
    println!("===================================\n");

    // Generate two years of synthetic demand history
    println!("Generating sample data...");
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let observations = synthetic::generate(start, end, 42)?;
    println!("Sample data created: {} daily observations\n", observations.len());

    // Engineer the feature table
    println!("Building features...");
    let frame = FeatureBuilder::default().build(&observations)?;
    println!(
        "Feature table: {} rows x {} input columns (first {} days dropped as lag warmup)\n",
        frame.len(),
        frame.feature_columns().len(),
        observations.len() - frame.len()
    );

    // Train with the temporal 80/20 split
    println!("Training model...");
    let mut forecaster = DemandForecaster::default();
    let fit = forecaster.train(&frame, frame.target_column())?;
    println!(
        "Model trained: R2 {:.3} on {} training rows, R2 {:.3} on {} held-out rows\n",
        fit.train_r2, fit.train_rows, fit.test_r2, fit.test_rows
    );

    // Predict over the held-out window and price the forecast error
    println!("Scoring business impact on the held-out window...");
    let holdout = frame.slice(fit.train_rows, None);
    let predicted = forecaster.predict(&holdout)?;
    let actual = holdout.target()?;

    let impact = BusinessImpactCalculator::default().calculate(&actual, &predicted)?;
    println!("{impact}");

    Ok(())
}
