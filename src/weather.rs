//! Conversion of weather observations into renewable generation.
use crate::units::Capacity;

/// Derating factor applied to PV output (soiling, wiring, inverter losses)
const PV_DERATING_FACTOR: f64 = 0.9;

/// Irradiance at standard test conditions (W/m²)
const STC_IRRADIANCE: f64 = 1000.0;

/// Cell temperature at standard test conditions (°C)
const STC_TEMPERATURE: f64 = 25.0;

/// Relative loss of PV output per degree above the standard test temperature
const PV_TEMPERATURE_COEFFICIENT: f64 = 0.0035;

/// Wind speed below which the turbine produces nothing (m/s)
const CUT_IN_SPEED: f64 = 2.5;

/// Wind speed from which the turbine produces its rated output (m/s)
const RATED_SPEED: f64 = 9.0;

/// Wind speed from which the turbine shuts down (m/s)
const CUT_OUT_SPEED: f64 = 25.0;

/// Hourly PV output for an array with the given rated capacity.
///
/// # Arguments
///
/// * `capacity` - Rated capacity of the array
/// * `irradiance` - Solar irradiance (W/m²)
/// * `temperature` - Ambient temperature (°C)
pub fn solar_output(capacity: Capacity, irradiance: f64, temperature: f64) -> f64 {
    capacity.value()
        * PV_DERATING_FACTOR
        * irradiance
        / STC_IRRADIANCE
        * (1.0 - PV_TEMPERATURE_COEFFICIENT * (temperature - STC_TEMPERATURE))
}

/// Hourly wind turbine output for the given rated capacity and wind speed (m/s).
///
/// Output follows a cubic curve between the cut-in and rated speeds, is flat at rated capacity up
/// to the cut-out speed and is zero otherwise.
pub fn wind_output(capacity: Capacity, wind_speed: f64) -> f64 {
    if (CUT_IN_SPEED..RATED_SPEED).contains(&wind_speed) {
        (wind_speed.powi(3) - CUT_IN_SPEED.powi(3)) / (RATED_SPEED.powi(3) - CUT_IN_SPEED.powi(3))
            * capacity.value()
    } else if (RATED_SPEED..CUT_OUT_SPEED).contains(&wind_speed) {
        capacity.value()
    } else {
        0.0
    }
}
