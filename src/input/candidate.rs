//! Code for reading candidate capacity vectors from a CSV file.
use super::{input_err_msg, read_csv};
use crate::capacity::{CapacityBounds, CapacityVector};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// The default name of the candidates file in a model directory
pub const CANDIDATES_FILE_NAME: &str = "candidates.csv";

/// A candidate record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct CandidateRaw {
    pv: f64,
    wind: f64,
    gas_turbine: f64,
    heat_pump: f64,
    electric_chiller: f64,
    absorption_chiller: f64,
    electric_storage: f64,
    heat_storage: f64,
    cold_storage: f64,
}

impl From<CandidateRaw> for CapacityVector {
    fn from(raw: CandidateRaw) -> Self {
        CapacityVector::new([
            raw.pv,
            raw.wind,
            raw.gas_turbine,
            raw.heat_pump,
            raw.electric_chiller,
            raw.absorption_chiller,
            raw.electric_storage,
            raw.heat_storage,
            raw.cold_storage,
        ])
    }
}

/// Read candidates from an iterator of raw records, checking them against the bounds
fn read_candidates_from_iter<I>(iter: I, bounds: &CapacityBounds) -> Result<Vec<CapacityVector>>
where
    I: Iterator<Item = CandidateRaw>,
{
    iter.enumerate()
        .map(|(idx, raw)| {
            let capacities = CapacityVector::from(raw);
            bounds
                .check(&capacities)
                .with_context(|| format!("Invalid candidate {idx}"))?;
            Ok(capacities)
        })
        .collect()
}

/// Read a population of candidate capacity vectors from the specified CSV file.
///
/// # Arguments
///
/// * `file_path` - Path to the candidates CSV file
/// * `bounds` - Upper bounds of the candidate domain
pub fn read_candidates(file_path: &Path, bounds: &CapacityBounds) -> Result<Vec<CapacityVector>> {
    let candidates_csv = read_csv(file_path)?;
    read_candidates_from_iter(candidates_csv, bounds).with_context(|| input_err_msg(file_path))
}
