//! Conversion devices and their carrier-conversion relations.
//!
//! Every converter ties all of its carrier flows to one internal reference quantity: at every
//! hour, `flow[carrier] / factor[carrier]` takes the same value for every attached carrier. The
//! default factor tables are:
//!
//! | Converter          | Inputs                        | Outputs                    |
//! |--------------------|-------------------------------|----------------------------|
//! | Gas turbine        | gas 1.0                       | electricity 0.33, heat 0.5 |
//! | Heat pump          | electricity 1.0               | heat 4.44                  |
//! | Electric chiller   | electricity 1.0               | cooling 2.87               |
//! | Absorption chiller | heat 0.983, electricity 0.017 | cooling 0.75               |
use crate::capacity::Device;
use crate::carrier::Carrier;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The kinds of conversion device in the microgrid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ConverterKind {
    /// Gas turbine producing electricity and heat
    GasTurbine,
    /// Electric heat pump
    HeatPump,
    /// Electric (compression) chiller
    ElectricChiller,
    /// Heat-driven absorption chiller
    AbsorptionChiller,
}

impl ConverterKind {
    /// The decision variable holding this converter's rated capacity
    pub const fn device(self) -> Device {
        match self {
            Self::GasTurbine => Device::GasTurbine,
            Self::HeatPump => Device::HeatPump,
            Self::ElectricChiller => Device::ElectricChiller,
            Self::AbsorptionChiller => Device::AbsorptionChiller,
        }
    }

    /// Carriers consumed by the converter
    pub const fn inputs(self) -> &'static [Carrier] {
        match self {
            Self::GasTurbine => &[Carrier::Gas],
            Self::HeatPump | Self::ElectricChiller => &[Carrier::Electricity],
            Self::AbsorptionChiller => &[Carrier::Heat, Carrier::Electricity],
        }
    }

    /// Carriers produced by the converter
    pub const fn outputs(self) -> &'static [Carrier] {
        match self {
            Self::GasTurbine => &[Carrier::Electricity, Carrier::Heat],
            Self::HeatPump => &[Carrier::Heat],
            Self::ElectricChiller | Self::AbsorptionChiller => &[Carrier::Cooling],
        }
    }

    /// The output to which the rated capacity refers
    pub const fn primary_output(self) -> Carrier {
        self.outputs()[0]
    }

    /// All carriers attached to the converter, inputs first
    pub fn carriers(self) -> impl Iterator<Item = Carrier> {
        self.inputs().iter().chain(self.outputs()).copied()
    }
}

/// Conversion factor per attached carrier, relative to the converter's reference quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionTable(IndexMap<Carrier, f64>);

impl ConversionTable {
    /// Get the conversion factor for a carrier.
    ///
    /// Only call this for carriers attached to the converter (checked by [`Self::validate`]).
    pub fn factor(&self, carrier: Carrier) -> f64 {
        *self
            .0
            .get(&carrier)
            .expect("Conversion table should have been validated")
    }

    /// Check that the table has a usable factor for exactly the carriers of `kind`
    pub fn validate(&self, kind: ConverterKind) -> Result<()> {
        for carrier in kind.carriers() {
            let factor = self.0.get(&carrier).copied();
            ensure!(
                factor.is_some_and(|f| f.is_finite() && f > 0.0),
                "Conversion factor for {carrier} of {kind} must be a finite number greater than \
                zero"
            );
        }
        ensure!(
            self.0.len() == kind.carriers().count(),
            "Conversion table for {kind} contains carriers not attached to it"
        );

        Ok(())
    }
}

impl<const N: usize> From<[(Carrier, f64); N]> for ConversionTable {
    fn from(entries: [(Carrier, f64); N]) -> Self {
        Self(entries.into_iter().collect())
    }
}

/// Conversion tables for every converter kind
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConverterParameters {
    /// Gas turbine conversion factors
    pub gas_turbine: ConversionTable,
    /// Heat pump conversion factors
    pub heat_pump: ConversionTable,
    /// Electric chiller conversion factors
    pub electric_chiller: ConversionTable,
    /// Absorption chiller conversion factors
    pub absorption_chiller: ConversionTable,
}

impl Default for ConverterParameters {
    fn default() -> Self {
        Self {
            gas_turbine: [
                (Carrier::Gas, 1.0),
                (Carrier::Electricity, 0.33),
                (Carrier::Heat, 0.5),
            ]
            .into(),
            heat_pump: [(Carrier::Electricity, 1.0), (Carrier::Heat, 4.44)].into(),
            electric_chiller: [(Carrier::Electricity, 1.0), (Carrier::Cooling, 2.87)].into(),
            absorption_chiller: [
                (Carrier::Heat, 0.983),
                (Carrier::Electricity, 0.017),
                (Carrier::Cooling, 0.75),
            ]
            .into(),
        }
    }
}

impl ConverterParameters {
    /// Get the conversion table for the given kind of converter
    pub fn table(&self, kind: ConverterKind) -> &ConversionTable {
        match kind {
            ConverterKind::GasTurbine => &self.gas_turbine,
            ConverterKind::HeatPump => &self.heat_pump,
            ConverterKind::ElectricChiller => &self.electric_chiller,
            ConverterKind::AbsorptionChiller => &self.absorption_chiller,
        }
    }

    /// Validate all conversion tables
    pub fn validate(&self) -> Result<()> {
        use strum::IntoEnumIterator;

        for kind in ConverterKind::iter() {
            self.table(kind).validate(kind)?;
        }

        Ok(())
    }
}
