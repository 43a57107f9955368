//! Energy storage devices and their technical parameters.
use crate::capacity::Device;
use crate::carrier::Carrier;
use crate::units::{Capacity, Dimensionless, Energy};
use anyhow::{Result, ensure};
use serde::Deserialize;
use strum::{Display, EnumIter, IntoEnumIterator};

/// The kinds of storage device in the microgrid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum StorageKind {
    /// Battery storage on the electricity bus
    Electric,
    /// Hot water storage on the heat bus
    Heat,
    /// Chilled water storage on the cooling bus
    Cold,
}

impl StorageKind {
    /// The carrier stored
    pub const fn carrier(self) -> Carrier {
        match self {
            Self::Electric => Carrier::Electricity,
            Self::Heat => Carrier::Heat,
            Self::Cold => Carrier::Cooling,
        }
    }

    /// The decision variable holding this storage's rated power
    pub const fn device(self) -> Device {
        match self {
            Self::Electric => Device::ElectricStorage,
            Self::Heat => Device::HeatStorage,
            Self::Cold => Device::ColdStorage,
        }
    }
}

/// Technical parameters of one kind of storage
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageParameters {
    /// Hours of rated power that make up the nominal energy capacity
    pub duration: f64,
    /// Fraction of the stored energy lost per hour
    pub loss_rate: Dimensionless,
    /// Fraction of the charging flow that ends up stored
    pub charge_efficiency: Dimensionless,
    /// Fraction of the stored energy withdrawn that reaches the bus
    pub discharge_efficiency: Dimensionless,
}

impl StorageParameters {
    /// Nominal energy capacity for a storage with the given rated power
    pub fn nominal_capacity(&self, rated_power: Capacity) -> Energy {
        Energy(rated_power.value() * self.duration)
    }

    /// Check that the parameters are physically meaningful
    fn validate(&self) -> Result<()> {
        ensure!(
            self.duration.is_finite() && self.duration > 0.0,
            "duration must be a finite number greater than zero"
        );
        ensure!(
            (0.0..1.0).contains(&self.loss_rate.0),
            "loss_rate must be in the range [0, 1)"
        );
        for (name, efficiency) in [
            ("charge_efficiency", self.charge_efficiency),
            ("discharge_efficiency", self.discharge_efficiency),
        ] {
            ensure!(
                efficiency.0 > 0.0 && efficiency.0 <= 1.0,
                "{name} must be in the range (0, 1]"
            );
        }

        Ok(())
    }
}

/// Parameters for every kind of storage
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageParameterMap {
    /// Battery storage
    pub electricity: StorageParameters,
    /// Hot water storage
    pub heat: StorageParameters,
    /// Chilled water storage
    pub cooling: StorageParameters,
}

impl Default for StorageParameterMap {
    fn default() -> Self {
        let thermal = StorageParameters {
            duration: 4.0 / 3.0,
            loss_rate: Dimensionless(0.001),
            charge_efficiency: Dimensionless(0.9),
            discharge_efficiency: Dimensionless(0.9),
        };

        Self {
            electricity: StorageParameters {
                duration: 2.0,
                loss_rate: Dimensionless(0.000_125),
                charge_efficiency: Dimensionless(0.95),
                discharge_efficiency: Dimensionless(0.9),
            },
            heat: thermal.clone(),
            cooling: thermal,
        }
    }
}

impl StorageParameterMap {
    /// Get the parameters for the given kind of storage
    pub fn get(&self, kind: StorageKind) -> &StorageParameters {
        match kind {
            StorageKind::Electric => &self.electricity,
            StorageKind::Heat => &self.heat,
            StorageKind::Cold => &self.cooling,
        }
    }

    /// Validate parameters for all kinds of storage
    pub fn validate(&self) -> Result<()> {
        for kind in StorageKind::iter() {
            self.get(kind)
                .validate()
                .map_err(|err| err.context(format!("Invalid parameters for {kind} storage")))?;
        }

        Ok(())
    }
}
