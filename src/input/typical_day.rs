//! Code for reading the typical day mapping from a CSV file.
use super::{input_err_msg, read_csv};
use crate::typical_day::{TypicalDay, TypicalDays};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const TYPICAL_DAYS_FILE_NAME: &str = "typical_days.csv";

/// A typical day record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct TypicalDayRaw {
    typical_day: u32,
    /// Comma-separated list of member calendar days
    days: String,
}

impl TypicalDayRaw {
    /// Parse the list of member days
    fn into_typical_day(self) -> Result<TypicalDay> {
        let members = self
            .days
            .split(',')
            .map(str::trim)
            .filter(|day| !day.is_empty())
            .map(|day| {
                day.parse::<u32>().with_context(|| {
                    format!("Invalid day '{day}' for typical day {}", self.typical_day)
                })
            })
            .collect::<Result<_>>()?;

        Ok(TypicalDay {
            id: self.typical_day,
            members,
        })
    }
}

/// Read typical days from an iterator of raw records
fn read_typical_days_from_iter<I>(iter: I, num_days: usize) -> Result<TypicalDays>
where
    I: Iterator<Item = TypicalDayRaw>,
{
    let days = iter
        .map(TypicalDayRaw::into_typical_day)
        .collect::<Result<Vec<_>>>()?;

    TypicalDays::new(days, num_days)
}

/// Read the mapping of typical days to the calendar days they represent.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `num_days` - Number of days in the planning horizon
pub fn read_typical_days(model_dir: &Path, num_days: usize) -> Result<TypicalDays> {
    let file_path = model_dir.join(TYPICAL_DAYS_FILE_NAME);
    let typical_days_csv = read_csv(&file_path)?;
    read_typical_days_from_iter(typical_days_csv, num_days)
        .with_context(|| input_err_msg(&file_path))
}
