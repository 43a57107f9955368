//! The module responsible for writing output data to disk.
use crate::capacity::{CapacityVector, Device};
use crate::carrier::Carrier;
use crate::dispatch::{Component, FlowDirection};
use crate::objective::{Evaluation, ObjectivePair};
use crate::search::non_dominated;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "mgsizing_results";

/// The output file name for candidate objectives
pub const OBJECTIVES_FILE_NAME: &str = "objectives.csv";

/// The output file name for dispatch flows
pub const DISPATCH_FILE_NAME: &str = "debug_dispatch.csv";

/// The output file name for storage levels
pub const STORAGE_FILE_NAME: &str = "debug_storage.csv";

/// The output file name for net load series
pub const NET_LOAD_FILE_NAME: &str = "debug_net_load.csv";

/// Get the output folder for the model at the specified path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory.
///
/// An existing, non-empty directory is only replaced if `allow_overwrite` is set.
///
/// # Returns
///
/// Whether an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if output_dir.is_dir() {
        let is_empty = output_dir.read_dir()?.next().is_none();
        if is_empty {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use the --overwrite option or choose \
            a different folder."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// A row of the objectives CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ObjectiveRow {
    candidate: usize,
    pv: f64,
    wind: f64,
    gas_turbine: f64,
    heat_pump: f64,
    electric_chiller: f64,
    absorption_chiller: f64,
    electric_storage: f64,
    heat_storage: f64,
    cold_storage: f64,
    economic: f64,
    complementarity: f64,
    feasible: bool,
    pareto_optimal: bool,
}

impl ObjectiveRow {
    fn new(
        candidate: usize,
        capacities: &CapacityVector,
        objectives: &ObjectivePair,
        pareto_optimal: bool,
    ) -> Self {
        let capacity = |device| capacities.get(device).value();
        Self {
            candidate,
            pv: capacity(Device::Pv),
            wind: capacity(Device::Wind),
            gas_turbine: capacity(Device::GasTurbine),
            heat_pump: capacity(Device::HeatPump),
            electric_chiller: capacity(Device::ElectricChiller),
            absorption_chiller: capacity(Device::AbsorptionChiller),
            electric_storage: capacity(Device::ElectricStorage),
            heat_storage: capacity(Device::HeatStorage),
            cold_storage: capacity(Device::ColdStorage),
            economic: objectives.economic,
            complementarity: objectives.complementarity,
            feasible: objectives.is_feasible(),
            pareto_optimal,
        }
    }
}

/// A row of the dispatch debug file: one hourly flow of one typical day
#[derive(Serialize, Debug, PartialEq)]
struct DispatchRow {
    candidate: usize,
    typical_day: u32,
    component: Component,
    carrier: Carrier,
    direction: FlowDirection,
    hour: usize,
    flow: f64,
}

/// A row of the storage debug file: the level of one storage at the start of one hour.
///
/// Step 24 is the level at the end of the day.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct StorageRow {
    candidate: usize,
    typical_day: u32,
    component: Component,
    step: usize,
    level: f64,
}

/// A row of the net load debug file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct NetLoadRow {
    candidate: usize,
    hour: usize,
    electricity: f64,
    heat: f64,
    cooling: f64,
}

/// For writing extra debug information about the evaluated candidates
struct DebugDataWriter {
    dispatch_writer: csv::Writer<File>,
    storage_writer: csv::Writer<File>,
    net_load_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            dispatch_writer: new_writer(DISPATCH_FILE_NAME)?,
            storage_writer: new_writer(STORAGE_FILE_NAME)?,
            net_load_writer: new_writer(NET_LOAD_FILE_NAME)?,
        })
    }

    /// Write the dispatch and net load of one candidate
    fn write_evaluation(&mut self, candidate: usize, evaluation: &Evaluation) -> Result<()> {
        for (&typical_day, dispatch) in &evaluation.dispatch {
            for (key, flows) in dispatch.iter_flows() {
                for (hour, &flow) in flows.iter().enumerate() {
                    self.dispatch_writer.serialize(DispatchRow {
                        candidate,
                        typical_day,
                        component: key.component,
                        carrier: key.carrier,
                        direction: key.direction,
                        hour,
                        flow,
                    })?;
                }
            }

            for (component, levels) in dispatch.iter_storage_levels() {
                for (step, &level) in levels.iter().enumerate() {
                    self.storage_writer.serialize(StorageRow {
                        candidate,
                        typical_day,
                        component,
                        step,
                        level,
                    })?;
                }
            }
        }

        let net_load = &evaluation.net_load;
        let series = |carrier| {
            net_load
                .get(carrier)
                .expect("Net load is kept for electricity, heat and cooling")
        };
        let (electricity, heat, cooling) = (
            series(Carrier::Electricity),
            series(Carrier::Heat),
            series(Carrier::Cooling),
        );
        for hour in 0..net_load.num_hours() {
            self.net_load_writer.serialize(NetLoadRow {
                candidate,
                hour,
                electricity: electricity[hour],
                heat: heat[hour],
                cooling: cooling[hour],
            })?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.dispatch_writer.flush()?;
        self.storage_writer.flush()?;
        self.net_load_writer.flush()?;

        Ok(())
    }
}

/// An object for writing evaluation results to file
pub struct DataWriter {
    objectives_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, save_debug_info: bool) -> Result<Self> {
        let debug_writer = if save_debug_info {
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            objectives_writer: csv::Writer::from_path(output_path.join(OBJECTIVES_FILE_NAME))?,
            debug_writer,
        })
    }

    /// Whether debug files are being written
    pub fn is_debug(&self) -> bool {
        self.debug_writer.is_some()
    }

    /// Write the objectives of a population, flagging its non-dominated members.
    ///
    /// `objectives[i]` must belong to `population[i]`.
    pub fn write_objectives(
        &mut self,
        population: &[CapacityVector],
        objectives: &[ObjectivePair],
    ) -> Result<()> {
        ensure!(
            population.len() == objectives.len(),
            "Got {} objective pairs for {} candidates",
            objectives.len(),
            population.len()
        );

        let pareto_optimal = non_dominated(objectives);
        for (candidate, ((capacities, objectives), pareto_optimal)) in population
            .iter()
            .zip(objectives)
            .zip(pareto_optimal)
            .enumerate()
        {
            let row = ObjectiveRow::new(candidate, capacities, objectives, pareto_optimal);
            self.objectives_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write dispatch and net load of a successfully evaluated candidate, if debugging
    pub fn write_debug_info(&mut self, candidate: usize, evaluation: &Evaluation) -> Result<()> {
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_evaluation(candidate, evaluation)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.objectives_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HighsSolver;
    use crate::fixture::zero_model;
    use crate::model::Model;
    use crate::objective::evaluate_candidate_detailed;
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    fn pair(economic: f64, complementarity: f64) -> ObjectivePair {
        ObjectivePair {
            economic,
            complementarity,
        }
    }

    #[test]
    fn test_write_objectives() {
        let dir = tempdir().unwrap();
        let population = [
            CapacityVector::default().with(Device::Pv, 1.0),
            CapacityVector::default().with(Device::Wind, 2.0),
            CapacityVector::default(),
        ];
        let objectives = [pair(1.0, 2.0), pair(2.0, 3.0), ObjectivePair::INFEASIBLE];
        {
            let mut writer = DataWriter::create(dir.path(), false).unwrap();
            writer.write_objectives(&population, &objectives).unwrap();
            writer.flush().unwrap();
        }

        let records: Vec<ObjectiveRow> =
            csv::Reader::from_path(dir.path().join(OBJECTIVES_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], ObjectiveRow::new(0, &population[0], &objectives[0], true));
        assert_eq!(records[1].wind, 2.0);
        assert!(records[1].feasible);
        assert!(!records[1].pareto_optimal);
        assert!(!records[2].feasible);
        assert!(records[2].economic.is_infinite());
        assert!(!dir.path().join(DISPATCH_FILE_NAME).exists());
    }

    #[test]
    fn test_write_objectives_length_mismatch() {
        let dir = tempdir().unwrap();
        let mut writer = DataWriter::create(dir.path(), false).unwrap();
        assert!(
            writer
                .write_objectives(&[CapacityVector::default()], &[])
                .is_err()
        );
    }

    #[rstest]
    fn test_write_debug_info(zero_model: Model) {
        let evaluation =
            evaluate_candidate_detailed(&zero_model, &HighsSolver, &CapacityVector::default())
                .unwrap();

        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), true).unwrap();
            assert!(writer.is_debug());
            writer.write_debug_info(7, &evaluation).unwrap();
            writer.flush().unwrap();
        }

        let net_load: Vec<NetLoadRow> = csv::Reader::from_path(dir.path().join(NET_LOAD_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(net_load.len(), zero_model.operation_data.num_hours());
        assert!(net_load.iter().all(|row| row.candidate == 7));

        let dispatch = fs::read_to_string(dir.path().join(DISPATCH_FILE_NAME)).unwrap();
        let mut lines = dispatch.lines();
        assert_eq!(
            lines.next().unwrap(),
            "candidate,typical_day,component,carrier,direction,hour,flow"
        );
        assert!(lines.next().unwrap().starts_with("7,1,grid,electricity,into_bus,0,"));

        // Every storage has a level at the start of each hour and at the end of the day
        let storage: Vec<StorageRow> = csv::Reader::from_path(dir.path().join(STORAGE_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(storage.len(), 3 * 25);
        assert_eq!(storage[0].component, Component::ElectricStorage);
        assert_eq!(storage[0].step, 0);
        assert_eq!(storage[24].step, 24);
        assert_eq!(storage[25].component, Component::HeatStorage);
        assert!(storage.iter().all(|row| row.candidate == 7 && row.typical_day == 1));
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");

        // New directory
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Existing empty directory
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Existing non-empty directory
        fs::write(output_dir.join("file.txt"), "contents").unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(!output_dir.join("file.txt").exists());
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("my_model");
        fs::create_dir(&model_dir).unwrap();
        assert_eq!(
            get_output_dir(&model_dir).unwrap(),
            PathBuf::from("mgsizing_results/my_model")
        );
    }
}
