//! The energy network solved for one representative day.
//!
//! A [`Network`] gathers everything the dispatch model needs for one candidate and one day: the
//! exogenous profiles of demands and renewables, the prices of purchased energy and the ratings
//! of converters and storages. It is built fresh for every (candidate, day) pair.
use crate::capacity::{CapacityVector, Device};
use crate::carrier::Carrier;
use crate::converter::{ConversionTable, ConverterKind};
use crate::model::ModelParameters;
use crate::operation::HourlyRecord;
use crate::storage::{StorageKind, StorageParameters};
use crate::weather::{solar_output, wind_output};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// A named element of the network which exchanges flow with one or more buses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Component {
    /// Electricity import from the utility grid
    Grid,
    /// Natural gas supply
    GasSupply,
    /// Expensive slack source of heat
    BackupHeat,
    /// Expensive slack source of cooling
    BackupCooling,
    /// Photovoltaic array
    Pv,
    /// Wind turbine
    Wind,
    /// Electrical load
    ElectricityDemand,
    /// Heat load
    HeatDemand,
    /// Cooling load
    CoolingDemand,
    /// Curtailment valve for surplus electricity
    ElectricityOverflow,
    /// Dump for surplus heat
    HeatOverflow,
    /// Dump for surplus cooling
    CoolingOverflow,
    /// Gas turbine
    GasTurbine,
    /// Electric heat pump
    HeatPump,
    /// Electric chiller
    ElectricChiller,
    /// Absorption chiller
    AbsorptionChiller,
    /// Battery
    ElectricStorage,
    /// Hot water tank
    HeatStorage,
    /// Chilled water tank
    ColdStorage,
}

impl From<ConverterKind> for Component {
    fn from(kind: ConverterKind) -> Self {
        match kind {
            ConverterKind::GasTurbine => Self::GasTurbine,
            ConverterKind::HeatPump => Self::HeatPump,
            ConverterKind::ElectricChiller => Self::ElectricChiller,
            ConverterKind::AbsorptionChiller => Self::AbsorptionChiller,
        }
    }
}

impl From<StorageKind> for Component {
    fn from(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Electric => Self::ElectricStorage,
            StorageKind::Heat => Self::HeatStorage,
            StorageKind::Cold => Self::ColdStorage,
        }
    }
}

/// Whether a flow injects energy into its bus or withdraws energy from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlowDirection {
    /// The component supplies the bus
    IntoBus,
    /// The component draws from the bus
    FromBus,
}

impl FlowDirection {
    /// Coefficient of a flow in its bus's balance row
    pub const fn sign(self) -> f64 {
        match self {
            Self::IntoBus => 1.0,
            Self::FromBus => -1.0,
        }
    }
}

/// Identifies one hourly flow series between a component and a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// The component at one end of the flow
    pub component: Component,
    /// The bus at the other end of the flow
    pub carrier: Carrier,
    /// Direction relative to the bus
    pub direction: FlowDirection,
}

impl FlowKey {
    /// Create a new [`FlowKey`]
    pub const fn new(component: Component, carrier: Carrier, direction: FlowDirection) -> Self {
        Self {
            component,
            carrier,
            direction,
        }
    }
}

/// How the flow of a source is determined
#[derive(Debug, Clone, PartialEq)]
pub enum SourceProfile {
    /// Unlimited supply bought at the given hourly price
    Priced(Vec<f64>),
    /// Free supply which must be taken in full each hour
    Fixed(Vec<f64>),
}

/// Injects flow into a bus
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Which source this is
    pub component: Component,
    /// The bus supplied
    pub carrier: Carrier,
    /// Price or fixed output for each hour
    pub profile: SourceProfile,
}

/// How the flow of a sink is determined
#[derive(Debug, Clone, PartialEq)]
pub enum SinkProfile {
    /// Demand which must be met exactly each hour
    Fixed(Vec<f64>),
    /// Unlimited, free disposal of surplus
    Overflow,
}

/// Withdraws flow from a bus
#[derive(Debug, Clone, PartialEq)]
pub struct Sink {
    /// Which sink this is
    pub component: Component,
    /// The bus drawn from
    pub carrier: Carrier,
    /// Fixed demand or overflow
    pub profile: SinkProfile,
}

/// A converter with its conversion factors and the upper bound of each output flow
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    /// The kind of converter
    pub kind: ConverterKind,
    /// Conversion factor per attached carrier
    pub factors: ConversionTable,
    /// Upper bound of the hourly flow for each output carrier
    pub output_capacities: IndexMap<Carrier, f64>,
}

impl Converter {
    /// Derive output bounds from the rated capacity of the primary output.
    ///
    /// All outputs are limited at the same value of the converter's reference quantity, so
    /// `bound[out] = rated * factor[out] / factor[primary]`.
    fn new(kind: ConverterKind, factors: &ConversionTable, rated: f64) -> Self {
        let primary_factor = factors.factor(kind.primary_output());
        let output_capacities = kind
            .outputs()
            .iter()
            .map(|&carrier| (carrier, rated * factors.factor(carrier) / primary_factor))
            .collect();

        Self {
            kind,
            factors: factors.clone(),
            output_capacities,
        }
    }
}

/// A storage device on one bus
#[derive(Debug, Clone, PartialEq)]
pub struct Storage {
    /// The kind of storage
    pub kind: StorageKind,
    /// Maximum hourly charge or discharge flow
    pub rated_power: f64,
    /// Maximum stored energy
    pub nominal_capacity: f64,
    /// Loss rate and efficiencies
    pub parameters: StorageParameters,
}

/// The network for one candidate on one representative day
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    /// Number of hourly time steps
    pub num_hours: usize,
    /// Upper bound on otherwise unlimited flows
    pub flow_bound: f64,
    /// Purchased and renewable supplies
    pub sources: Vec<Source>,
    /// Demands and overflows
    pub sinks: Vec<Sink>,
    /// Conversion devices
    pub converters: Vec<Converter>,
    /// Storage devices
    pub storages: Vec<Storage>,
}

impl Network {
    /// Build the network for one candidate and one day of hourly records.
    ///
    /// # Arguments
    ///
    /// * `capacities` - The candidate's rated capacities
    /// * `parameters` - Prices and technical parameters of the model
    /// * `day` - Hourly loads and weather for the representative day
    pub fn new(
        capacities: &CapacityVector,
        parameters: &ModelParameters,
        day: &[HourlyRecord],
    ) -> Self {
        let prices = &parameters.prices;
        let pv = capacities.get(Device::Pv);
        let wind = capacities.get(Device::Wind);

        let sources = vec![
            Source {
                component: Component::Grid,
                carrier: Carrier::Electricity,
                profile: SourceProfile::Priced(prices.electricity.hourly_values()),
            },
            Source {
                component: Component::GasSupply,
                carrier: Carrier::Gas,
                profile: SourceProfile::Priced(prices.gas.hourly_values()),
            },
            Source {
                component: Component::BackupHeat,
                carrier: Carrier::Heat,
                profile: SourceProfile::Priced(vec![prices.backup_heat.value(); day.len()]),
            },
            Source {
                component: Component::BackupCooling,
                carrier: Carrier::Cooling,
                profile: SourceProfile::Priced(vec![prices.backup_cooling.value(); day.len()]),
            },
            Source {
                component: Component::Pv,
                carrier: Carrier::Electricity,
                profile: SourceProfile::Fixed(hourly_values(day, |hour| {
                    solar_output(pv, hour.solar_irradiance, hour.temperature)
                })),
            },
            Source {
                component: Component::Wind,
                carrier: Carrier::Electricity,
                profile: SourceProfile::Fixed(hourly_values(day, |hour| {
                    wind_output(wind, hour.wind_speed)
                })),
            },
        ];

        let sinks = vec![
            Sink {
                component: Component::ElectricityDemand,
                carrier: Carrier::Electricity,
                profile: SinkProfile::Fixed(hourly_values(day, |hour| hour.electricity_load)),
            },
            Sink {
                component: Component::HeatDemand,
                carrier: Carrier::Heat,
                profile: SinkProfile::Fixed(hourly_values(day, |hour| hour.heat_load)),
            },
            Sink {
                component: Component::CoolingDemand,
                carrier: Carrier::Cooling,
                profile: SinkProfile::Fixed(hourly_values(day, |hour| hour.cooling_load)),
            },
            Sink {
                component: Component::ElectricityOverflow,
                carrier: Carrier::Electricity,
                profile: SinkProfile::Overflow,
            },
            Sink {
                component: Component::HeatOverflow,
                carrier: Carrier::Heat,
                profile: SinkProfile::Overflow,
            },
            Sink {
                component: Component::CoolingOverflow,
                carrier: Carrier::Cooling,
                profile: SinkProfile::Overflow,
            },
        ];

        let converters = ConverterKind::iter()
            .map(|kind| {
                Converter::new(
                    kind,
                    parameters.converters.table(kind),
                    capacities.get(kind.device()).value(),
                )
            })
            .collect();

        let storages = StorageKind::iter()
            .map(|kind| {
                let storage_parameters = parameters.storage.get(kind);
                let rated_power = capacities.get(kind.device());
                Storage {
                    kind,
                    rated_power: rated_power.value(),
                    nominal_capacity: storage_parameters.nominal_capacity(rated_power).value(),
                    parameters: storage_parameters.clone(),
                }
            })
            .collect();

        Self {
            num_hours: day.len(),
            flow_bound: prices.unlimited_flow_bound,
            sources,
            sinks,
            converters,
            storages,
        }
    }
}

/// Extract one hourly series from a day of records
fn hourly_values<F>(day: &[HourlyRecord], f: F) -> Vec<f64>
where
    F: Fn(&HourlyRecord) -> f64,
{
    day.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{model_parameters, sunny_day};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn source<'a>(network: &'a Network, component: Component) -> &'a Source {
        network
            .sources
            .iter()
            .find(|source| source.component == component)
            .unwrap()
    }

    #[rstest]
    fn test_network_profiles(model_parameters: ModelParameters, sunny_day: Vec<HourlyRecord>) {
        let capacities = CapacityVector::default()
            .with(Device::Pv, 100.0)
            .with(Device::Wind, 50.0);
        let network = Network::new(&capacities, &model_parameters, &sunny_day);
        assert_eq!(network.num_hours, 24);

        let SourceProfile::Fixed(pv) = &source(&network, Component::Pv).profile else {
            panic!("PV output should be fixed")
        };
        assert_approx_eq!(
            f64,
            pv[12],
            solar_output(
                capacities.get(Device::Pv),
                sunny_day[12].solar_irradiance,
                sunny_day[12].temperature
            )
        );

        let SourceProfile::Priced(prices) = &source(&network, Component::Grid).profile else {
            panic!("Grid supply should be priced")
        };
        assert_eq!(prices.len(), 24);
        assert_approx_eq!(f64, prices[0], 0.1598);

        let demand = network
            .sinks
            .iter()
            .find(|sink| sink.component == Component::HeatDemand)
            .unwrap();
        assert_eq!(
            demand.profile,
            SinkProfile::Fixed(sunny_day.iter().map(|hour| hour.heat_load).collect())
        );
    }

    #[rstest]
    fn test_converter_output_capacities(model_parameters: ModelParameters) {
        let table = model_parameters.converters.table(ConverterKind::GasTurbine);
        let converter = Converter::new(ConverterKind::GasTurbine, table, 33.0);
        assert_approx_eq!(f64, converter.output_capacities[&Carrier::Electricity], 33.0);
        assert_approx_eq!(f64, converter.output_capacities[&Carrier::Heat], 50.0);
        assert!(!converter.output_capacities.contains_key(&Carrier::Gas));
    }

    #[rstest]
    fn test_storage_capacity(model_parameters: ModelParameters, sunny_day: Vec<HourlyRecord>) {
        let capacities = CapacityVector::default().with(Device::ElectricStorage, 10.0);
        let network = Network::new(&capacities, &model_parameters, &sunny_day);
        let battery = &network.storages[0];
        assert_eq!(battery.kind, StorageKind::Electric);
        assert_approx_eq!(f64, battery.rated_power, 10.0);
        assert_approx_eq!(f64, battery.nominal_capacity, 20.0);
    }
}
