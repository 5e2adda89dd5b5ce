//! Deterministic synthetic demand history for demos and tests
//!
//! The generated series has the shape of real retail data: yearly
//! seasonality, a slow upward trend, weekday effects, promotional
//! event windows in December and June, and Gaussian noise. The same
//! seed always produces the same records.

use std::f64::consts::PI;

use chrono::{Datelike, Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::data::Observation;
use crate::error::{ForecastError, Result};

/// Baseline daily demand before seasonal and calendar effects
const BASE_DEMAND: f64 = 100.0;
/// Amplitude of the yearly sine seasonality
const YEARLY_AMPLITUDE: f64 = 50.0;
/// Demand added per elapsed day
const TREND_PER_DAY: f64 = 0.1;
/// Additive weekday effect, Monday through Sunday
const WEEKDAY_EFFECT: [f64; 7] = [0.0, -10.0, -5.0, 0.0, 5.0, 15.0, 20.0];
/// Extra demand during the December 1-25 run-up
const DECEMBER_BUMP: f64 = 80.0;
/// Extra demand during the June sale
const JUNE_BUMP: f64 = 40.0;

/// Generate one observation per day over `[start, end]`, inclusive
///
/// Fails with a data format error when the range is reversed. Demand
/// is clamped at zero after noise, matching how a till would record a
/// day with no sales.
pub fn generate(start: NaiveDate, end: NaiveDate, seed: u64) -> Result<Vec<Observation>> {
    if end < start {
        return Err(ForecastError::DataFormat(format!(
            "generation range ends ({end}) before it starts ({start})"
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 15.0).unwrap();
    let temperature = Normal::new(25.0, 8.0).unwrap();

    let days = (end - start).num_days() as usize + 1;
    let mut records = Vec::with_capacity(days);
    for day_index in 0..days {
        let date = start
            .checked_add_days(Days::new(day_index as u64))
            .ok_or_else(|| {
                ForecastError::DataFormat("date range exceeds the calendar".into())
            })?;
        let day_of_year = date.ordinal() as f64;
        let seasonal = YEARLY_AMPLITUDE * (2.0 * PI * day_of_year / 365.0).sin();
        let trend = TREND_PER_DAY * day_index as f64;
        let weekday = WEEKDAY_EFFECT[date.weekday().num_days_from_monday() as usize];
        let event = event_bump(date);

        let demand = (BASE_DEMAND + seasonal + trend + weekday + event + noise.sample(&mut rng))
            .max(0.0);

        records.push(Observation {
            date,
            demand,
            avg_price: rng.gen_range(50.0..150.0),
            promotion: rng.gen_bool(0.3),
            holiday: event > 0.0,
            temperature: temperature.sample(&mut rng),
        });
    }

    Ok(records)
}

/// Event demand for a date: the December run-up or the June sale
fn event_bump(date: NaiveDate) -> f64 {
    if date.month() == 12 && date.day() <= 25 {
        DECEMBER_BUMP
    } else if date.month() == 6 {
        JUNE_BUMP
    } else {
        0.0
    }
}
