//! # Demand Forecast
//!
//! A Rust library for retail demand forecasting and inventory cost
//! impact analysis.
//!
//! ## Features
//!
//! - Daily demand history handling (CSV in, CSV out)
//! - Feature engineering: calendar fields, cyclic encodings, lagged
//!   demand, and trailing rolling means
//! - Random forest regression with a temporal train/test split
//! - Single-file model artifacts that round-trip exact predictions
//! - Inventory policy simulation translating forecast error into
//!   holding and stockout cost
//! - Deterministic synthetic data generation for demos and tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::{BusinessImpactCalculator, DataLoader, DemandForecaster, FeatureBuilder};
//!
//! fn main() -> demand_forecast::Result<()> {
//!     let observations = DataLoader::from_csv("data/raw/retail_data.csv")?;
//!     let frame = FeatureBuilder::default().build(&observations)?;
//!
//!     let mut forecaster = DemandForecaster::default();
//!     let fit = forecaster.train(&frame, "demand")?;
//!     println!("held-out R2: {:.3}", fit.test_r2);
//!
//!     let predicted = forecaster.predict(&frame)?;
//!     let impact =
//!         BusinessImpactCalculator::default().calculate(&frame.target()?, &predicted)?;
//!     println!("{impact}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod impact;
pub mod metrics;
pub mod model;
pub mod synthetic;

// Re-export commonly used types
pub use crate::config::{CostParams, FeatureConfig, ForestParams};
pub use crate::data::{DataLoader, Observation};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureBuilder, FeatureFrame};
pub use crate::forecaster::DemandForecaster;
pub use crate::impact::{BusinessImpactCalculator, ImpactReport, PolicyCost};
pub use crate::model::{train_model, FitReport, TrainedDemandModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
