//! The model definition: everything needed to evaluate candidate capacity vectors.
use crate::operation::OperationData;
use crate::typical_day::TypicalDays;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
///
/// A model is read-only once loaded, so it can be shared between evaluation workers.
///
/// The typical days must refer only to calendar days covered by `operation_data`. This is
/// checked by [`load_model`](crate::input::load_model); evaluating a model assembled by hand
/// which breaks it gives an error for every candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Hourly loads and weather for the planning horizon
    pub operation_data: OperationData,
    /// Representative days and their clusters
    pub typical_days: TypicalDays,
}

impl Model {
    /// Number of days in the planning horizon
    pub fn num_days(&self) -> usize {
        self.operation_data.num_days()
    }
}
