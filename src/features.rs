//! Feature engineering for daily demand series
//!
//! Turns raw observations into the model's feature table: calendar
//! fields, cyclic encodings, lagged demand, and trailing rolling
//! means. Rows without full history for the longest lag or window are
//! dropped, so the table starts `warmup_rows` into the series.

use std::f64::consts::PI;
use std::fs::{self, File};
use std::path::Path;

use chrono::{Datelike, Days, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use crate::config::FeatureConfig;
use crate::data::Observation;
use crate::error::{ForecastError, Result};

/// Name of the date key column
pub const DATE_COLUMN: &str = "date";
/// Name of the prediction target column
pub const TARGET_COLUMN: &str = "demand";

/// Builds the engineered feature table from raw observations
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    /// Create a builder with explicit lag and window settings
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// The lag and window settings this builder applies
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build the feature table from date-ordered observations
    ///
    /// Lag and rolling features index by row, so the input must be a
    /// gap-free daily series for "lag 7" to mean "a week ago". The
    /// builder enforces strict date ordering; gap handling is up to
    /// the caller.
    pub fn build(&self, records: &[Observation]) -> Result<FeatureFrame> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::DataFormat(format!(
                    "observations must be strictly ordered by date; {} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        if self.config.lags.iter().any(|&lag| lag == 0) {
            return Err(ForecastError::DataFormat(
                "lag offsets must be at least 1".into(),
            ));
        }
        if self.config.rolling_windows.iter().any(|&window| window == 0) {
            return Err(ForecastError::DataFormat(
                "rolling windows must be at least 1".into(),
            ));
        }
        if has_duplicates(&self.config.lags) {
            return Err(ForecastError::DataFormat(
                "lag offsets must be distinct".into(),
            ));
        }
        if has_duplicates(&self.config.rolling_windows) {
            return Err(ForecastError::DataFormat(
                "rolling windows must be distinct".into(),
            ));
        }

        let warmup = self.config.warmup_rows();
        if records.len() <= warmup {
            return Err(ForecastError::InsufficientData(format!(
                "{} observations cannot support lags {:?} and windows {:?}; need at least {}",
                records.len(),
                self.config.lags,
                self.config.rolling_windows,
                warmup + 1
            )));
        }

        let demand: Vec<f64> = records.iter().map(|r| r.demand).collect();
        let kept = &records[warmup..];

        let mut columns = Vec::with_capacity(
            16 + self.config.lags.len() + self.config.rolling_windows.len(),
        );

        columns.push(Series::new(
            DATE_COLUMN,
            kept.iter().map(|r| r.date).collect::<Vec<NaiveDate>>(),
        ));
        columns.push(Series::new(
            TARGET_COLUMN,
            kept.iter().map(|r| r.demand).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "avg_price",
            kept.iter().map(|r| r.avg_price).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "promotion",
            kept.iter()
                .map(|r| f64::from(u8::from(r.promotion)))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "holiday",
            kept.iter()
                .map(|r| f64::from(u8::from(r.holiday)))
                .collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "temperature",
            kept.iter().map(|r| r.temperature).collect::<Vec<f64>>(),
        ));

        // Calendar features
        columns.push(Series::new(
            "year",
            kept.iter().map(|r| r.date.year() as f64).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "month",
            kept.iter().map(|r| r.date.month() as f64).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "day_of_year",
            kept.iter().map(|r| r.date.ordinal() as f64).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "week_of_year",
            kept.iter()
                .map(|r| r.date.iso_week().week() as f64)
                .collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "quarter",
            kept.iter().map(|r| quarter(r.date) as f64).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "is_weekend",
            kept.iter()
                .map(|r| if is_weekend(r.date) { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>(),
        ));

        // Cyclic encodings keep December adjacent to January. The
        // day-of-year period stays 365 in leap years; day 366 folds
        // just past the origin.
        columns.push(Series::new(
            "month_sin",
            kept.iter()
                .map(|r| (2.0 * PI * r.date.month() as f64 / 12.0).sin())
                .collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "month_cos",
            kept.iter()
                .map(|r| (2.0 * PI * r.date.month() as f64 / 12.0).cos())
                .collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "day_of_year_sin",
            kept.iter()
                .map(|r| (2.0 * PI * r.date.ordinal() as f64 / 365.0).sin())
                .collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "day_of_year_cos",
            kept.iter()
                .map(|r| (2.0 * PI * r.date.ordinal() as f64 / 365.0).cos())
                .collect::<Vec<f64>>(),
        ));

        for &lag in &self.config.lags {
            let values: Vec<f64> = (warmup..records.len()).map(|i| demand[i - lag]).collect();
            columns.push(Series::new(format!("demand_lag_{lag}").as_str(), values));
        }

        for &window in &self.config.rolling_windows {
            let values: Vec<f64> = (warmup..records.len())
                .map(|i| {
                    let trailing = &demand[i + 1 - window..=i];
                    trailing.iter().sum::<f64>() / window as f64
                })
                .collect();
            columns.push(Series::new(format!("demand_mean_{window}").as_str(), values));
        }

        let df = DataFrame::new(columns)?;
        debug!(
            rows = df.height(),
            columns = df.width(),
            dropped = warmup,
            "engineered feature table"
        );

        Ok(FeatureFrame {
            df,
            date_column: DATE_COLUMN.to_string(),
            target_column: TARGET_COLUMN.to_string(),
        })
    }
}

/// Engineered feature table plus the identity of its key and target
/// columns
///
/// Every column except the date key and the target is a model input,
/// in the order it appears in the frame.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    df: DataFrame,
    date_column: String,
    target_column: String,
}

impl FeatureFrame {
    /// Wrap an existing DataFrame as a feature table
    ///
    /// The date column must be present; the target may be absent for
    /// prediction-only tables and is checked on access.
    pub fn from_parts(df: DataFrame, date_column: &str, target_column: &str) -> Result<Self> {
        if df.column(date_column).is_err() {
            return Err(ForecastError::DataFormat(format!(
                "column '{date_column}' not found in feature table"
            )));
        }

        Ok(Self {
            df,
            date_column: date_column.to_string(),
            target_column: target_column.to_string(),
        })
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the date column name
    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Get the target column name
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Number of feature rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().iter().any(|c| *c == name)
    }

    /// Model input column names: everything except the date key and
    /// the target, in frame order
    pub fn feature_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .filter(|name| *name != self.date_column && *name != self.target_column)
            .map(|name| name.to_string())
            .collect()
    }

    /// Get a column as f64 values
    pub fn column_as_f64(&self, name: &str) -> Result<Vec<f64>> {
        let col = self
            .df
            .column(name)
            .map_err(|e| ForecastError::DataFormat(format!("column '{name}' not found: {e}")))?;

        match col.dtype() {
            DataType::Float64 => Ok(col.f64().unwrap().into_iter().flatten().collect()),
            DataType::Float32 => Ok(col
                .f32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            _ => Err(ForecastError::DataFormat(format!(
                "column '{name}' cannot be converted to f64"
            ))),
        }
    }

    /// Get the target column as a vector
    pub fn target(&self) -> Result<Vec<f64>> {
        self.column_as_f64(&self.target_column)
    }

    /// Get the date column as calendar dates
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let col = self.df.column(&self.date_column)?;
        match col.dtype() {
            DataType::Date => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
                col.date()?
                    .into_iter()
                    .flatten()
                    .map(|days| {
                        if days >= 0 {
                            epoch.checked_add_days(Days::new(u64::from(days.unsigned_abs())))
                        } else {
                            epoch.checked_sub_days(Days::new(u64::from(days.unsigned_abs())))
                        }
                        .ok_or_else(|| {
                            ForecastError::DataFormat(format!("date value {days} out of range"))
                        })
                    })
                    .collect()
            }
            other => Err(ForecastError::DataFormat(format!(
                "column '{}' has dtype {other:?}, expected Date",
                self.date_column
            ))),
        }
    }

    /// Get a row-range slice of the table, end exclusive
    pub fn slice(&self, start: usize, end: Option<usize>) -> Self {
        let end = end.unwrap_or_else(|| self.df.height()).min(self.df.height());
        let length = end.saturating_sub(start);

        Self {
            df: self.df.slice(start as i64, length),
            date_column: self.date_column.clone(),
            target_column: self.target_column.clone(),
        }
    }

    /// Write the table to a CSV file, creating parent directories
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        let mut df = self.df.clone();
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;

        debug!(rows = self.df.height(), path = %path.display(), "wrote feature table");
        Ok(())
    }
}

/// Any value appearing more than once
fn has_duplicates(values: &[usize]) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|pair| pair[0] == pair[1])
}

/// Calendar quarter of a date, 1 through 4
fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Saturday or Sunday
fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}
