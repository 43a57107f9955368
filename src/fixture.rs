//! Fixtures for tests
use crate::model::{Model, ModelParameters};
use crate::operation::{HOURS_PER_DAY, HourlyRecord, OperationData};
use crate::typical_day::{TypicalDay, TypicalDays};
use rstest::fixture;
use std::f64::consts::PI;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters::default()
}

/// A day with constant loads and no wind or sun
pub fn flat_day(electricity: f64, heat: f64, cooling: f64) -> Vec<HourlyRecord> {
    vec![
        HourlyRecord {
            electricity_load: electricity,
            heat_load: heat,
            cooling_load: cooling,
            ..Default::default()
        };
        HOURS_PER_DAY
    ]
}

/// A summer day with varying loads, sun in daytime hours and a steady breeze
#[fixture]
pub fn sunny_day() -> Vec<HourlyRecord> {
    (0..HOURS_PER_DAY)
        .map(|hour| {
            let hour = hour as f64;
            let daylight = (PI * (hour - 6.0) / 12.0).sin().max(0.0);
            HourlyRecord {
                electricity_load: 80.0 + 40.0 * daylight,
                heat_load: 40.0 + 20.0 * (1.0 - daylight),
                cooling_load: 20.0 + 60.0 * daylight,
                solar_irradiance: 900.0 * daylight,
                wind_speed: 4.0 + 6.0 * (PI * hour / 12.0).cos().abs(),
                temperature: 20.0 + 10.0 * daylight,
            }
        })
        .collect()
}

/// Build a model with default parameters from hourly records and typical days
pub fn build_model(records: Vec<HourlyRecord>, typical_days: Vec<TypicalDay>) -> Model {
    let operation_data = OperationData::new(records).unwrap();
    let typical_days = TypicalDays::new(typical_days, operation_data.num_days()).unwrap();

    Model {
        model_path: PathBuf::new(),
        parameters: ModelParameters::default(),
        operation_data,
        typical_days,
    }
}

/// A one-day horizon with no demand, sun or wind
#[fixture]
pub fn zero_model() -> Model {
    build_model(
        flat_day(0.0, 0.0, 0.0),
        vec![TypicalDay {
            id: 1,
            members: vec![1],
        }],
    )
}
