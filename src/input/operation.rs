//! Code for reading historical operation data from a CSV file.
use super::{input_err_msg, read_csv};
use crate::operation::{DAYS_PER_YEAR, HOURS_PER_DAY, HourlyRecord, OperationData};
use anyhow::{Context, Result, ensure};
use std::path::Path;

const OPERATION_DATA_FILE_NAME: &str = "operation_data.csv";

/// Read operation data from an iterator of hourly records, checking the length of the horizon
fn read_operation_data_from_iter<I>(iter: I, num_hours: usize) -> Result<OperationData>
where
    I: Iterator<Item = HourlyRecord>,
{
    let records: Vec<_> = iter.collect();
    ensure!(
        records.len() == num_hours,
        "Operation data must contain exactly {num_hours} hourly rows (got {})",
        records.len()
    );

    OperationData::new(records)
}

/// Read a full year of hourly operation data.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The operation data, indexed by hour of the year, or an error.
pub fn read_operation_data(model_dir: &Path) -> Result<OperationData> {
    let file_path = model_dir.join(OPERATION_DATA_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_operation_data_from_iter(records, DAYS_PER_YEAR * HOURS_PER_DAY)
        .with_context(|| input_err_msg(&file_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use tempfile::tempdir;

    /// Create an operation data file with the given number of rows
    fn create_operation_data_file(dir_path: &Path, num_rows: usize) {
        let file = File::create(dir_path.join(OPERATION_DATA_FILE_NAME)).unwrap();
        let mut file = BufWriter::new(file);
        writeln!(
            file,
            "electricity_load,heat_load,cooling_load,solar_irradiance,wind_speed,temperature"
        )
        .unwrap();
        for hour in 0..num_rows {
            writeln!(file, "{},20.0,10.0,0.0,5.0,12.5", 100 + hour % 24).unwrap();
        }
    }

    #[test]
    fn test_read_operation_data() {
        let dir = tempdir().unwrap();
        create_operation_data_file(dir.path(), 8760);

        let data = read_operation_data(dir.path()).unwrap();
        assert_eq!(data.num_days(), 365);
        assert_eq!(data.num_hours(), 8760);
        assert_eq!(
            data.day(365).unwrap()[23],
            HourlyRecord {
                electricity_load: 123.0,
                heat_load: 20.0,
                cooling_load: 10.0,
                solar_irradiance: 0.0,
                wind_speed: 5.0,
                temperature: 12.5,
            }
        );
    }

    #[test]
    fn test_read_operation_data_wrong_length() {
        let dir = tempdir().unwrap();
        create_operation_data_file(dir.path(), 8736);
        assert!(read_operation_data(dir.path()).is_err());
    }

    #[test]
    fn test_read_operation_data_from_iter_short_horizon() {
        let records = vec![HourlyRecord::default(); 48];
        let data = read_operation_data_from_iter(records.into_iter(), 48).unwrap();
        assert_eq!(data.num_days(), 2);
    }
}
