//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::capacity::{CapacityBounds, CapacityVector, Device};
use crate::converter::ConverterParameters;
use crate::input::{input_err_msg, read_toml};
use crate::operation::HOURS_PER_DAY;
use crate::storage::StorageParameterMap;
use crate::units::{Capacity, Money, MoneyPerCapacity, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

define_unit_param_default!(default_electricity_price, MoneyPerEnergy, 0.1598);
define_unit_param_default!(default_gas_price, MoneyPerEnergy, 0.0286);
define_unit_param_default!(default_backup_price, MoneyPerEnergy, 1e7);
define_unit_param_default!(default_storage_connection_charge, Money, 520.0);
define_unit_param_default!(default_connection_threshold, Capacity, 0.1);

fn default_unlimited_flow_bound() -> f64 {
    1e9
}

/// A price which is either constant or varies by hour of the day
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceProfile {
    /// The same price in every hour
    Flat(MoneyPerEnergy),
    /// One price for each hour of the day
    Hourly(Vec<MoneyPerEnergy>),
}

impl PriceProfile {
    /// The price in each hour of a day, as raw values for the dispatch model
    pub fn hourly_values(&self) -> Vec<f64> {
        match self {
            Self::Flat(price) => vec![price.value(); HOURS_PER_DAY],
            Self::Hourly(prices) => prices.iter().map(|price| price.value()).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        let prices = match self {
            Self::Flat(price) => std::slice::from_ref(price),
            Self::Hourly(prices) => {
                ensure!(
                    prices.len() == HOURS_PER_DAY,
                    "Hourly prices must have exactly {HOURS_PER_DAY} values (got {})",
                    prices.len()
                );
                prices.as_slice()
            }
        };
        ensure!(
            prices
                .iter()
                .all(|price| price.is_finite() && price.value() >= 0.0),
            "Prices must be finite, non-negative numbers"
        );

        Ok(())
    }
}

/// Prices paid for energy bought from outside the microgrid
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceParameters {
    /// Price of grid electricity
    #[serde(default = "default_electricity_price_profile")]
    pub electricity: PriceProfile,
    /// Price of natural gas
    #[serde(default = "default_gas_price_profile")]
    pub gas: PriceProfile,
    /// Price of backup heat. Deliberately large so that backup is a last resort.
    #[serde(default = "default_backup_price")]
    pub backup_heat: MoneyPerEnergy,
    /// Price of backup cooling. Deliberately large so that backup is a last resort.
    #[serde(default = "default_backup_price")]
    pub backup_cooling: MoneyPerEnergy,
    /// Upper bound for flows which are otherwise unlimited (imports, overflows)
    #[serde(default = "default_unlimited_flow_bound")]
    pub unlimited_flow_bound: f64,
}

fn default_electricity_price_profile() -> PriceProfile {
    PriceProfile::Flat(default_electricity_price())
}

fn default_gas_price_profile() -> PriceProfile {
    PriceProfile::Flat(default_gas_price())
}

impl Default for PriceParameters {
    fn default() -> Self {
        Self {
            electricity: default_electricity_price_profile(),
            gas: default_gas_price_profile(),
            backup_heat: default_backup_price(),
            backup_cooling: default_backup_price(),
            unlimited_flow_bound: default_unlimited_flow_bound(),
        }
    }
}

impl PriceParameters {
    fn validate(&self) -> Result<()> {
        self.electricity
            .validate()
            .context("Invalid electricity price")?;
        self.gas.validate().context("Invalid gas price")?;
        for (name, price) in [
            ("backup_heat", self.backup_heat),
            ("backup_cooling", self.backup_cooling),
        ] {
            ensure!(
                price.is_finite() && price.value() > 0.0,
                "{name} must be a finite number greater than zero"
            );
        }
        ensure!(
            self.unlimited_flow_bound.is_finite() && self.unlimited_flow_bound > 0.0,
            "unlimited_flow_bound must be a finite number greater than zero"
        );

        Ok(())
    }
}

/// Annualised cost coefficients used by the economic objective
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    /// Annualised cost per kW of PV
    pub pv: MoneyPerCapacity,
    /// Annualised cost per kW of wind
    pub wind: MoneyPerCapacity,
    /// Annualised cost per kW of gas turbine
    pub gas_turbine: MoneyPerCapacity,
    /// Annualised cost per kW of heat pump
    pub heat_pump: MoneyPerCapacity,
    /// Annualised cost per kW of electric chiller
    pub electric_chiller: MoneyPerCapacity,
    /// Annualised cost per kW of absorption chiller
    pub absorption_chiller: MoneyPerCapacity,
    /// Annualised cost per kW of electric storage
    pub electric_storage: MoneyPerCapacity,
    /// Annualised cost per kW of heat storage
    pub heat_storage: MoneyPerCapacity,
    /// Annualised cost per kW of cold storage
    pub cold_storage: MoneyPerCapacity,
    /// Fixed charge for connecting a thermal (heat or cold) storage
    pub storage_connection_charge: Money,
    /// Rated power above which a thermal storage counts as installed
    pub connection_threshold: Capacity,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            pv: MoneyPerCapacity(76.441_883_71),
            wind: MoneyPerCapacity(110.423_321_8),
            gas_turbine: MoneyPerCapacity(50.320_741_01),
            heat_pump: MoneyPerCapacity(21.215_279_03),
            electric_chiller: MoneyPerCapacity(22.855_635_66),
            absorption_chiller: MoneyPerCapacity(21.816_743_13),
            electric_storage: MoneyPerCapacity(35.114_567_51),
            heat_storage: MoneyPerCapacity(1.689_590_459),
            cold_storage: MoneyPerCapacity(1.689_590_459),
            storage_connection_charge: default_storage_connection_charge(),
            connection_threshold: default_connection_threshold(),
        }
    }
}

impl CostParameters {
    /// Annualised cost per unit of rated capacity for the given device
    pub fn unit_cost(&self, device: Device) -> MoneyPerCapacity {
        match device {
            Device::Pv => self.pv,
            Device::Wind => self.wind,
            Device::GasTurbine => self.gas_turbine,
            Device::HeatPump => self.heat_pump,
            Device::ElectricChiller => self.electric_chiller,
            Device::AbsorptionChiller => self.absorption_chiller,
            Device::ElectricStorage => self.electric_storage,
            Device::HeatStorage => self.heat_storage,
            Device::ColdStorage => self.cold_storage,
        }
    }

    /// Annualised investment cost of a candidate, including thermal storage connection charges.
    ///
    /// Heat and cold storage each incur the connection charge independently once their rated
    /// power exceeds the connection threshold.
    pub fn investment_cost(&self, capacities: &CapacityVector) -> Money {
        let capacity_cost: Money = capacities
            .iter()
            .map(|(device, capacity)| self.unit_cost(device) * capacity)
            .sum();

        let connection_cost: Money = [Device::HeatStorage, Device::ColdStorage]
            .into_iter()
            .filter(|&device| capacities.get(device) > self.connection_threshold)
            .map(|_| self.storage_connection_charge)
            .sum();

        capacity_cost + connection_cost
    }

    fn validate(&self) -> Result<()> {
        use strum::IntoEnumIterator;

        for device in Device::iter() {
            let cost = self.unit_cost(device);
            ensure!(
                cost.is_finite() && cost.value() >= 0.0,
                "Cost coefficient for {device} must be a finite, non-negative number"
            );
        }
        ensure!(
            self.storage_connection_charge.is_finite()
                && self.storage_connection_charge.value() >= 0.0,
            "storage_connection_charge must be a finite, non-negative number"
        );
        ensure!(
            self.connection_threshold.is_finite() && self.connection_threshold.value() >= 0.0,
            "connection_threshold must be a finite, non-negative number"
        );

        Ok(())
    }
}

/// Represents the contents of the entire model file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Energy prices
    pub prices: PriceParameters,
    /// Annualised cost coefficients
    pub costs: CostParameters,
    /// Conversion factor tables
    pub converters: ConverterParameters,
    /// Storage parameters
    pub storage: StorageParameterMap,
    /// Upper bounds for candidate capacities
    pub capacity_bounds: CapacityBounds,
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        self.prices.validate()?;
        self.costs.validate()?;
        self.converters.validate()?;
        self.storage.validate()?;
        self.capacity_bounds.validate()?;

        Ok(())
    }
}
