use chrono::NaiveDate;
use demand_forecast::model::store;
use demand_forecast::{synthetic, DemandForecaster, FeatureBuilder, ForestParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: Model Persistence Example");
    println!("==========================================\n");

    // A smaller forest keeps the example quick
    let params = ForestParams {
        n_trees: 25,
        ..ForestParams::default()
    };

    println!("Generating sample data and training...");
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let observations = synthetic::generate(start, end, 7)?;
    let frame = FeatureBuilder::default().build(&observations)?;

    let mut forecaster = DemandForecaster::new(params);
    let fit = forecaster.train(&frame, frame.target_column())?;
    println!("Trained: held-out R2 {:.3}\n", fit.test_r2);

    // Save the artifact and load it back as a fresh model
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("demand_forecaster.json");
    forecaster.save(&path)?;
    println!("Artifact written to {}", path.display());

    let restored = store::load_model(&path)?;
    println!(
        "Restored model expects {} feature columns\n",
        restored.feature_columns().len()
    );

    // The restored model predicts exactly what the original does
    let original = forecaster.predict(&frame)?;
    let reloaded = restored.predict(&frame)?;
    let identical = original
        .iter()
        .zip(reloaded.iter())
        .all(|(a, b)| a == b);
    println!("Predictions identical after reload: {identical}");

    Ok(())
}
