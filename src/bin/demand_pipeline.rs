//! Offline demand forecasting pipeline
//!
//! Subcommands cover the batch workflow end to end: generate synthetic
//! history, export the engineered feature table, train and persist the
//! model, and score a stored model's business impact.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use demand_forecast::metrics::root_mean_squared_error;
use demand_forecast::model::store;
use demand_forecast::{
    synthetic, BusinessImpactCalculator, CostParams, DataLoader, FeatureBuilder, ForestParams,
};

#[derive(Parser)]
#[command(name = "demand_pipeline", version, about = "Retail demand forecasting pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate deterministic synthetic demand history
    Generate {
        /// First day of the series
        #[arg(long, default_value = "2020-01-01")]
        start: NaiveDate,
        /// Last day of the series, inclusive
        #[arg(long, default_value = "2024-12-31")]
        end: NaiveDate,
        /// Generator seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output CSV path
        #[arg(long, default_value = "data/raw/retail_data.csv")]
        out: PathBuf,
    },
    /// Build the feature table from raw history and export it
    Features {
        /// Raw observation CSV
        #[arg(long, default_value = "data/raw/retail_data.csv")]
        data: PathBuf,
        /// Output CSV path for the feature table
        #[arg(long, default_value = "data/processed/features.csv")]
        out: PathBuf,
    },
    /// Train the demand model and persist the artifact
    Train {
        /// Raw observation CSV
        #[arg(long, default_value = "data/raw/retail_data.csv")]
        data: PathBuf,
        /// Where to write the model artifact
        #[arg(long, default_value = "models/demand_forecaster.json")]
        model: PathBuf,
        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        trees: usize,
        /// Maximum tree depth
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
        /// Training seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Score a stored model against history and report cost impact
    Impact {
        /// Raw observation CSV
        #[arg(long, default_value = "data/raw/retail_data.csv")]
        data: PathBuf,
        /// Model artifact to load
        #[arg(long, default_value = "models/demand_forecaster.json")]
        model: PathBuf,
        /// Holding cost per excess unit
        #[arg(long, default_value_t = 5.0)]
        holding_cost: f64,
        /// Lost-sale cost per unit of unmet demand
        #[arg(long, default_value_t = 15.0)]
        stockout_cost: f64,
        /// Extra stock fraction for the safety-margin policy
        #[arg(long, default_value_t = 0.10)]
        safety_margin: f64,
        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            start,
            end,
            seed,
            out,
        } => {
            let observations = synthetic::generate(start, end, seed)?;
            DataLoader::to_csv(&observations, &out)?;
            println!(
                "Wrote {} observations ({} to {}) to {}",
                observations.len(),
                start,
                end,
                out.display()
            );
        }
        Commands::Features { data, out } => {
            let observations = DataLoader::from_csv(&data)?;
            let frame = FeatureBuilder::default().build(&observations)?;
            frame.write_csv(&out)?;
            println!(
                "Wrote {} feature rows x {} input columns to {}",
                frame.len(),
                frame.feature_columns().len(),
                out.display()
            );
        }
        Commands::Train {
            data,
            model,
            trees,
            max_depth,
            seed,
        } => {
            let observations = DataLoader::from_csv(&data)?;
            let frame = FeatureBuilder::default().build(&observations)?;
            let params = ForestParams {
                n_trees: trees,
                max_depth,
                seed,
                ..ForestParams::default()
            };

            let trained = demand_forecast::train_model(&frame, frame.target_column(), &params)?;
            let fit = trained.fit_report();
            println!("Train R2:    {:.4}  ({} rows)", fit.train_r2, fit.train_rows);
            println!("Held-out R2: {:.4}  ({} rows)", fit.test_r2, fit.test_rows);

            let holdout = frame.slice(fit.train_rows, None);
            let rmse = root_mean_squared_error(&holdout.target()?, &trained.predict(&holdout)?);
            println!("Held-out RMSE: {rmse:.2} units");

            println!("Top feature importances:");
            for (name, importance) in trained.feature_importance_ranking().into_iter().take(5) {
                println!("  {name}: {importance:.4}");
            }

            store::save_model(&trained, &model)?;
            println!("Model saved to {}", model.display());
        }
        Commands::Impact {
            data,
            model,
            holding_cost,
            stockout_cost,
            safety_margin,
            json,
        } => {
            let observations = DataLoader::from_csv(&data)?;
            let frame = FeatureBuilder::default().build(&observations)?;
            let trained = store::load_model(&model)?;

            let predicted = trained.predict(&frame)?;
            let actual = frame.target()?;

            let calculator = BusinessImpactCalculator::new(CostParams {
                holding_cost,
                stockout_cost,
                safety_margin,
            });
            let report = calculator.calculate(&actual, &predicted)?;
            println!("{report}");

            if let Some(path) = json {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                println!("Report JSON written to {}", path.display());
            }
        }
    }

    Ok(())
}
