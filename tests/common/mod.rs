//! Helpers for generating model directories in integration tests.
#![allow(dead_code)]
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Representative days and the (inclusive) range of calendar days each stands in for
pub const TYPICAL_DAYS: [(u32, u32, u32); 3] = [(10, 1, 120), (200, 121, 240), (300, 241, 365)];

/// Candidates written to `candidates.csv`
pub const CANDIDATES: [[f64; 9]; 4] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [200.0, 100.0, 80.0, 40.0, 30.0, 20.0, 100.0, 50.0, 20.0],
    [500.0, 0.0, 0.0, 60.0, 50.0, 0.0, 200.0, 0.0, 0.0],
    [0.0, 300.0, 150.0, 0.0, 0.0, 40.0, 0.0, 100.0, 50.0],
];

/// Hourly loads and weather, with daily and seasonal cycles
fn operation_data() -> String {
    let mut csv = String::from(
        "electricity_load,heat_load,cooling_load,solar_irradiance,wind_speed,temperature\n",
    );
    for hour_of_year in 0..8760 {
        let day = f64::from(hour_of_year / 24);
        let hour = f64::from(hour_of_year % 24);
        let summer = (PI * day / 365.0).sin();
        let daylight = (PI * (hour - 6.0) / 12.0).sin().max(0.0);
        writeln!(
            csv,
            "{},{},{},{},{},{}",
            60.0 + 40.0 * daylight,
            20.0 + 60.0 * (1.0 - summer),
            5.0 + 80.0 * summer * daylight,
            (300.0 + 600.0 * summer) * daylight,
            3.0 + 8.0 * (PI * (day + hour) / 30.0).sin().abs(),
            5.0 + 20.0 * summer + 5.0 * daylight,
        )
        .unwrap();
    }

    csv
}

fn typical_days() -> String {
    let mut csv = String::from("typical_day,days\n");
    for (id, first, last) in TYPICAL_DAYS {
        let days: Vec<_> = (first..=last).map(|day| day.to_string()).collect();
        writeln!(csv, "{id},\"{}\"", days.join(",")).unwrap();
    }

    csv
}

fn candidates() -> String {
    let mut csv = String::from(
        "pv,wind,gas_turbine,heat_pump,electric_chiller,absorption_chiller,electric_storage,\
        heat_storage,cold_storage\n",
    );
    for candidate in CANDIDATES {
        let values: Vec<_> = candidate.iter().map(f64::to_string).collect();
        writeln!(csv, "{}", values.join(",")).unwrap();
    }

    csv
}

/// Write a complete model to the given directory
pub fn write_model(model_dir: &Path) {
    fs::create_dir_all(model_dir).unwrap();
    fs::write(
        model_dir.join("model.toml"),
        "[prices]\nelectricity = 0.1598\n\n[capacity_bounds]\npv = 5000.0\n",
    )
    .unwrap();
    fs::write(model_dir.join("operation_data.csv"), operation_data()).unwrap();
    fs::write(model_dir.join("typical_days.csv"), typical_days()).unwrap();
    fs::write(model_dir.join("candidates.csv"), candidates()).unwrap();
}
