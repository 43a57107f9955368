//! Candidate capacity vectors proposed by the outer search.
use crate::units::Capacity;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// A device whose rated capacity is a decision variable of the sizing problem.
///
/// The order of variants is the order of entries in a [`CapacityVector`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Device {
    /// Photovoltaic array
    Pv,
    /// Wind turbine
    Wind,
    /// Gas turbine (combined heat and power)
    GasTurbine,
    /// Electric heat pump
    HeatPump,
    /// Electric (compression) chiller
    ElectricChiller,
    /// Absorption chiller
    AbsorptionChiller,
    /// Battery storage
    ElectricStorage,
    /// Hot water storage
    HeatStorage,
    /// Chilled water storage
    ColdStorage,
}

impl Device {
    /// Position of this device in a [`CapacityVector`]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Number of decision variables in a [`CapacityVector`]
pub const NUM_DEVICES: usize = Device::COUNT;

/// Rated capacities for every [`Device`] (kW, or kW of rated power for storages).
///
/// Capacity vectors are owned by the outer search and only ever read during evaluation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityVector([f64; NUM_DEVICES]);

impl CapacityVector {
    /// Create a capacity vector from raw values, ordered as the [`Device`] variants
    pub const fn new(values: [f64; NUM_DEVICES]) -> Self {
        Self(values)
    }

    /// Get the rated capacity of the given device
    pub fn get(&self, device: Device) -> Capacity {
        Capacity(self.0[device.index()])
    }

    /// Return a copy of this vector with the capacity of one device replaced
    pub fn with(mut self, device: Device, value: f64) -> Self {
        self.0[device.index()] = value;
        self
    }

    /// The raw values, ordered as the [`Device`] variants
    pub fn values(&self) -> &[f64; NUM_DEVICES] {
        &self.0
    }

    /// Iterate over devices and their rated capacities
    pub fn iter(&self) -> impl Iterator<Item = (Device, Capacity)> + '_ {
        Device::iter().map(|device| (device, self.get(device)))
    }
}

impl From<[f64; NUM_DEVICES]> for CapacityVector {
    fn from(values: [f64; NUM_DEVICES]) -> Self {
        Self(values)
    }
}

/// Inclusive upper bounds of the candidate vector domain. All lower bounds are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityBounds {
    /// Upper bound for PV capacity
    pub pv: f64,
    /// Upper bound for wind capacity
    pub wind: f64,
    /// Upper bound for gas turbine capacity
    pub gas_turbine: f64,
    /// Upper bound for heat pump capacity
    pub heat_pump: f64,
    /// Upper bound for electric chiller capacity
    pub electric_chiller: f64,
    /// Upper bound for absorption chiller capacity
    pub absorption_chiller: f64,
    /// Upper bound for electric storage rated power
    pub electric_storage: f64,
    /// Upper bound for heat storage rated power
    pub heat_storage: f64,
    /// Upper bound for cold storage rated power
    pub cold_storage: f64,
}

impl Default for CapacityBounds {
    fn default() -> Self {
        Self {
            pv: 10000.0,
            wind: 10000.0,
            gas_turbine: 10000.0,
            heat_pump: 3000.0,
            electric_chiller: 1000.0,
            absorption_chiller: 1000.0,
            electric_storage: 20000.0,
            heat_storage: 6000.0,
            cold_storage: 2000.0,
        }
    }
}

impl CapacityBounds {
    /// Get the upper bound for the given device
    pub fn upper(&self, device: Device) -> f64 {
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

    /// Check that the bounds themselves are usable
    pub fn validate(&self) -> Result<()> {
        for device in Device::iter() {
            let upper = self.upper(device);
            ensure!(
                upper.is_finite() && upper >= 0.0,
                "Upper bound for {device} must be a finite, non-negative number"
            );
        }

        Ok(())
    }

    /// Check that a candidate lies within `[0, upper]` for every device
    pub fn check(&self, capacities: &CapacityVector) -> Result<()> {
        for (device, capacity) in capacities.iter() {
            let upper = self.upper(device);
            ensure!(
                capacity.is_finite() && (0.0..=upper).contains(&capacity.value()),
                "Capacity for {device} ({capacity}) is outside the range [0, {upper}]"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_capacity_vector_order() {
        let capacities = CapacityVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(capacities.get(Device::Pv), Capacity(1.0));
        assert_eq!(capacities.get(Device::GasTurbine), Capacity(3.0));
        assert_eq!(capacities.get(Device::ColdStorage), Capacity(9.0));
    }

    #[test]
    fn test_capacity_vector_with() {
        let capacities = CapacityVector::default().with(Device::HeatPump, 12.5);
        assert_eq!(capacities.get(Device::HeatPump), Capacity(12.5));
        assert_eq!(capacities.get(Device::Pv), Capacity(0.0));
    }

    #[rstest]
    #[case(Device::Pv, 0.0, true)]
    #[case(Device::Pv, 10000.0, true)]
    #[case(Device::Pv, 10000.1, false)]
    #[case(Device::HeatPump, 3000.0, true)]
    #[case(Device::HeatPump, 3001.0, false)]
    #[case(Device::ColdStorage, -1.0, false)]
    #[case(Device::Wind, f64::NAN, false)]
    #[case(Device::ElectricStorage, f64::INFINITY, false)]
    fn test_capacity_bounds_check(
        #[case] device: Device,
        #[case] value: f64,
        #[case] expected_valid: bool,
    ) {
        let capacities = CapacityVector::default().with(device, value);
        assert_eq!(
            CapacityBounds::default().check(&capacities).is_ok(),
            expected_valid
        );
    }

    #[test]
    fn test_capacity_bounds_validate() {
        assert!(CapacityBounds::default().validate().is_ok());

        let bounds = CapacityBounds {
            wind: -5.0,
            ..CapacityBounds::default()
        };
        assert!(bounds.validate().is_err());
    }
}
