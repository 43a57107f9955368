//! Historical operation data: hourly loads and weather over the planning horizon.
use anyhow::{Result, ensure};
use serde::Deserialize;

/// Number of hours in one (representative) day
pub const HOURS_PER_DAY: usize = 24;

/// Number of days in the planning horizon of a full-year data set
pub const DAYS_PER_YEAR: usize = 365;

/// One hour of historical operation data
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
pub struct HourlyRecord {
    /// Electrical load (kW)
    pub electricity_load: f64,
    /// Heat load (kW)
    pub heat_load: f64,
    /// Cooling load (kW)
    pub cooling_load: f64,
    /// Solar irradiance (W/m²)
    pub solar_irradiance: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Ambient temperature (°C)
    pub temperature: f64,
}

impl HourlyRecord {
    /// Check that the values in this record are physically meaningful
    fn validate(&self) -> Result<()> {
        let values = [
            ("electricity_load", self.electricity_load),
            ("heat_load", self.heat_load),
            ("cooling_load", self.cooling_load),
            ("solar_irradiance", self.solar_irradiance),
            ("wind_speed", self.wind_speed),
        ];
        for (name, value) in values {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be a finite, non-negative number (got {value})"
            );
        }
        ensure!(
            self.temperature.is_finite(),
            "temperature must be a finite number"
        );

        Ok(())
    }
}

/// Hourly operation data covering a whole number of days, indexed by hour of the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct OperationData(Vec<HourlyRecord>);

impl OperationData {
    /// Create operation data from hourly records.
    ///
    /// The number of records must be a non-zero multiple of [`HOURS_PER_DAY`].
    pub fn new(records: Vec<HourlyRecord>) -> Result<Self> {
        ensure!(!records.is_empty(), "Operation data cannot be empty");
        ensure!(
            records.len() % HOURS_PER_DAY == 0,
            "Operation data must cover whole days ({} rows is not a multiple of {HOURS_PER_DAY})",
            records.len()
        );
        for (hour, record) in records.iter().enumerate() {
            record
                .validate()
                .map_err(|err| err.context(format!("Invalid operation data for hour {hour}")))?;
        }

        Ok(Self(records))
    }

    /// Number of days covered by the data
    pub fn num_days(&self) -> usize {
        self.num_hours() / HOURS_PER_DAY
    }

    /// Number of hours covered by the data
    pub fn num_hours(&self) -> usize {
        self.0.len()
    }

    /// The 24 hourly records for the given calendar day (1-indexed), if the data covers it
    pub fn day(&self, day: u32) -> Option<&[HourlyRecord]> {
        let start = (day as usize).checked_sub(1)? * HOURS_PER_DAY;
        self.0.get(start..start + HOURS_PER_DAY)
    }
}
