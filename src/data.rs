//! Raw demand history: one observation per day, CSV in and out
//!
//! The expected CSV schema is
//! `date,demand,avg_price,promotion,holiday,temperature` with ISO-8601
//! dates and `0`/`1` flags. Rows may arrive in any order; the loader
//! sorts them and rejects duplicate dates.

use std::fs::{self, File};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{ForecastError, Result};

/// A single day of demand history for one product or series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar day; unique key of the series
    pub date: NaiveDate,
    /// Units demanded, non-negative
    pub demand: f64,
    /// Average unit price, positive
    pub avg_price: f64,
    /// Whether a promotion ran this day
    #[serde(serialize_with = "flag_to_int", deserialize_with = "flag_from_int")]
    pub promotion: bool,
    /// Whether this day is a holiday or event day
    #[serde(serialize_with = "flag_to_int", deserialize_with = "flag_from_int")]
    pub holiday: bool,
    /// Mean temperature for the day, degrees Celsius
    pub temperature: f64,
}

/// Loader for observation CSV files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load observations from a CSV file, validate them, and sort by date
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let file = File::open(path.as_ref())?;
        let mut reader = csv::Reader::from_reader(file);

        let mut records = Vec::new();
        for row in reader.deserialize::<Observation>() {
            let record = row.map_err(|e| {
                if e.is_io_error() {
                    ForecastError::Csv(e)
                } else {
                    ForecastError::DataFormat(e.to_string())
                }
            })?;
            records.push(record);
        }

        debug!(rows = records.len(), "read observation records");
        Self::from_records(records)
    }

    /// Validate in-memory records and sort them by date
    ///
    /// Checks each record for finite, in-range values and rejects
    /// duplicate dates. The calling pipeline is responsible for where
    /// the records came from; this only guarantees their shape.
    pub fn from_records(mut records: Vec<Observation>) -> Result<Vec<Observation>> {
        for record in &records {
            validate(record)?;
        }

        records.sort_by_key(|r| r.date);

        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(ForecastError::DataFormat(format!(
                    "duplicate observation for {}",
                    pair[0].date
                )));
            }
        }

        Ok(records)
    }

    /// Write observations to a CSV file, creating parent directories
    pub fn to_csv<P: AsRef<Path>>(records: &[Observation], path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!(rows = records.len(), path = %path.display(), "wrote observation records");
        Ok(())
    }
}

fn validate(record: &Observation) -> Result<()> {
    if !record.demand.is_finite() || record.demand < 0.0 {
        return Err(ForecastError::DataFormat(format!(
            "demand on {} must be finite and non-negative, got {}",
            record.date, record.demand
        )));
    }
    if !record.avg_price.is_finite() || record.avg_price <= 0.0 {
        return Err(ForecastError::DataFormat(format!(
            "avg_price on {} must be finite and positive, got {}",
            record.date, record.avg_price
        )));
    }
    if !record.temperature.is_finite() {
        return Err(ForecastError::DataFormat(format!(
            "temperature on {} must be finite, got {}",
            record.date, record.temperature
        )));
    }
    Ok(())
}

fn flag_from_int<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match u8::deserialize(deserializer)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "flag must be 0 or 1, got {other}"
        ))),
    }
}

fn flag_to_int<S>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}
