//! Code for performing the dispatch optimisation of one representative day.
//!
//! For a fixed candidate, the dispatch model decides the hour-by-hour operation of every device
//! so that each bus balances at least cost. The model is a linear program with these parts:
//!
//! * one balance row per bus and hour (inflows equal outflows);
//! * demands and renewable outputs fixed to their hourly profiles;
//! * grid, gas and backup supplies bounded only by a very large number and priced per unit;
//! * converters whose flows are all tied to one reference quantity by their conversion factors;
//! * storages with hourly losses, asymmetric efficiencies and a free level at the start of the
//!   day.
//!
//! The storage level at the end of the day is not tied to its initial level.
use crate::carrier::Carrier;
use crate::units::Money;
use anyhow::{Result, bail};
use indexmap::IndexMap;
use log::debug;

mod constraints;
use constraints::add_dispatch_constraints;
pub mod network;
pub use network::{Component, FlowDirection, FlowKey, Network};
pub mod problem;
use problem::{LinearProgram, Variable};
pub mod solver;
pub use solver::{HighsSolver, LpSolution, LpSolver, SolveStatus};

/// A map for easy lookup of variables in the problem.
///
/// The entries are ordered (see [`IndexMap`]).
///
/// We use this data structure for two things:
///
/// 1. In order define constraints for the optimisation
/// 2. To keep track of which flow each variable corresponds to, for when we are reading the
///    results of the optimisation.
#[derive(Debug, Default)]
pub struct VariableMap {
    flows: IndexMap<FlowKey, Vec<Variable>>,
    levels: IndexMap<Component, Vec<Variable>>,
}

impl VariableMap {
    /// Iterate over the hourly variables of every flow
    pub fn iter_flows(&self) -> impl Iterator<Item = (&FlowKey, &[Variable])> {
        self.flows.iter().map(|(key, vars)| (key, vars.as_slice()))
    }

    /// Get the hourly variables of the given flow.
    fn flow_vars(
        &self,
        component: Component,
        carrier: Carrier,
        direction: FlowDirection,
    ) -> &[Variable] {
        self.flows
            .get(&FlowKey::new(component, carrier, direction))
            .expect("No variables found for given flow")
    }

    /// Get the storage level variables of the given storage (one more than the number of hours)
    fn level_vars(&self, component: Component) -> &[Variable] {
        self.levels
            .get(&component)
            .expect("No level variables found for given storage")
    }

    /// Add one variable per hour for a flow
    fn add_flow(
        &mut self,
        problem: &mut LinearProgram,
        key: FlowKey,
        costs: &[f64],
        upper_bound: f64,
    ) {
        let vars = costs
            .iter()
            .enumerate()
            .map(|(hour, &cost)| {
                let name = format!(
                    "{}.{}.{}[{hour}]",
                    key.component, key.carrier, key.direction
                );
                problem.add_column(name, cost, 0.0..=upper_bound)
            })
            .collect();

        let existing = self.flows.insert(key, vars);
        assert!(existing.is_none(), "Duplicate flow variables for {key:?}");
    }
}

/// The solved dispatch of one representative day
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    /// Status reported by the solver
    pub status: SolveStatus,
    /// Cost of purchased energy over the day
    pub operating_cost: Money,
    flows: IndexMap<FlowKey, Vec<f64>>,
    storage_levels: IndexMap<Component, Vec<f64>>,
}

impl DispatchResult {
    /// Hourly values of a flow, if the network has such a flow
    pub fn flow(
        &self,
        component: Component,
        carrier: Carrier,
        direction: FlowDirection,
    ) -> Option<&[f64]> {
        self.flows
            .get(&FlowKey::new(component, carrier, direction))
            .map(Vec::as_slice)
    }

    /// Iterate over the hourly values of every flow
    pub fn iter_flows(&self) -> impl Iterator<Item = (&FlowKey, &[f64])> {
        self.flows.iter().map(|(key, values)| (key, values.as_slice()))
    }

    /// Storage levels for the given storage, starting with the level at the start of the day
    pub fn storage_level(&self, component: Component) -> Option<&[f64]> {
        self.storage_levels.get(&component).map(Vec::as_slice)
    }

    /// Iterate over the levels of every storage
    pub fn iter_storage_levels(&self) -> impl Iterator<Item = (Component, &[f64])> {
        self.storage_levels
            .iter()
            .map(|(component, levels)| (*component, levels.as_slice()))
    }
}

/// Build the linear program for a network.
///
/// # Returns
///
/// The problem together with a [`VariableMap`] describing its columns.
pub fn build_dispatch_problem(network: &Network) -> (LinearProgram, VariableMap) {
    let mut problem = LinearProgram::default();
    let variables = add_variables(&mut problem, network);
    add_dispatch_constraints(&mut problem, &variables, network);

    (problem, variables)
}

/// Perform the dispatch optimisation for one network.
///
/// # Arguments
///
/// * `network` - The network for one candidate and representative day
/// * `solver` - The solver to use
///
/// # Returns
///
/// The solved flows and cost, or an error if the solver did not find an optimal solution.
pub fn perform_dispatch_optimisation<S: LpSolver + ?Sized>(
    network: &Network,
    solver: &S,
) -> Result<DispatchResult> {
    let (problem, variables) = build_dispatch_problem(network);
    debug!(
        "Solving dispatch problem with {} variables and {} constraints",
        problem.columns().len(),
        problem.rows().len()
    );

    let solution = solver.solve(&problem);
    if solution.status != SolveStatus::Optimal {
        bail!("Could not solve dispatch problem: {}", solution.status);
    }
    if solution.values.len() != problem.columns().len() {
        bail!(
            "Solver returned {} values for {} variables",
            solution.values.len(),
            problem.columns().len()
        );
    }

    let values = |vars: &[Variable]| -> Vec<f64> {
        vars.iter().map(|var| solution.values[var.index()]).collect()
    };
    let flows = variables
        .flows
        .iter()
        .map(|(key, vars)| (*key, values(vars)))
        .collect();
    let storage_levels = variables
        .levels
        .iter()
        .map(|(component, vars)| (*component, values(vars)))
        .collect();

    Ok(DispatchResult {
        status: solution.status,
        operating_cost: Money(solution.objective_value),
        flows,
        storage_levels,
    })
}

/// Add variables to the optimisation problem.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `network` - The network being dispatched
///
/// # Returns
///
/// A [`VariableMap`] with the problem's variables as values.
fn add_variables(problem: &mut LinearProgram, network: &Network) -> VariableMap {
    let mut variables = VariableMap::default();
    let no_cost = vec![0.0; network.num_hours];

    for source in &network.sources {
        let key = FlowKey::new(source.component, source.carrier, FlowDirection::IntoBus);
        let costs = match &source.profile {
            network::SourceProfile::Priced(prices) => prices.as_slice(),
            network::SourceProfile::Fixed(_) => no_cost.as_slice(),
        };
        variables.add_flow(problem, key, costs, network.flow_bound);
    }

    for sink in &network.sinks {
        let key = FlowKey::new(sink.component, sink.carrier, FlowDirection::FromBus);
        variables.add_flow(problem, key, &no_cost, network.flow_bound);
    }

    for converter in &network.converters {
        let component = converter.kind.into();
        for &carrier in converter.kind.inputs() {
            let key = FlowKey::new(component, carrier, FlowDirection::FromBus);
            variables.add_flow(problem, key, &no_cost, network.flow_bound);
        }
        for (&carrier, &capacity) in &converter.output_capacities {
            let key = FlowKey::new(component, carrier, FlowDirection::IntoBus);
            variables.add_flow(problem, key, &no_cost, capacity);
        }
    }

    for storage in &network.storages {
        let component = storage.kind.into();
        let carrier = storage.kind.carrier();
        for direction in [FlowDirection::IntoBus, FlowDirection::FromBus] {
            let key = FlowKey::new(component, carrier, direction);
            variables.add_flow(problem, key, &no_cost, storage.rated_power);
        }

        let levels = (0..=network.num_hours)
            .map(|step| {
                problem.add_column(
                    format!("{component}.level[{step}]"),
                    0.0,
                    0.0..=storage.nominal_capacity,
                )
            })
            .collect();
        variables.levels.insert(component, levels);
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::{CapacityVector, Device};
    use crate::converter::ConverterKind;
    use crate::fixture::{flat_day, model_parameters, sunny_day};
    use crate::model::ModelParameters;
    use crate::operation::HourlyRecord;
    use crate::storage::StorageKind;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    const TOLERANCE: f64 = 1e-5;

    fn dispatch(
        capacities: &CapacityVector,
        parameters: &ModelParameters,
        day: &[HourlyRecord],
    ) -> DispatchResult {
        let network = Network::new(capacities, parameters, day);
        perform_dispatch_optimisation(&network, &HighsSolver).unwrap()
    }

    #[rstest]
    fn test_dispatch_zero_scenario(model_parameters: ModelParameters) {
        let result = dispatch(
            &CapacityVector::default(),
            &model_parameters,
            &flat_day(0.0, 0.0, 0.0),
        );
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_approx_eq!(Money, result.operating_cost, Money(0.0), epsilon = TOLERANCE);
        for (_, values) in result.iter_flows() {
            assert!(values.iter().all(|value| value.abs() < TOLERANCE));
        }
    }

    #[rstest]
    fn test_dispatch_grid_only(model_parameters: ModelParameters) {
        let result = dispatch(
            &CapacityVector::default(),
            &model_parameters,
            &flat_day(100.0, 0.0, 0.0),
        );
        assert_approx_eq!(
            Money,
            result.operating_cost,
            Money(24.0 * 100.0 * 0.1598),
            epsilon = TOLERANCE
        );
        let grid = result
            .flow(Component::Grid, Carrier::Electricity, FlowDirection::IntoBus)
            .unwrap();
        assert!(grid.iter().all(|flow| (flow - 100.0).abs() < TOLERANCE));
    }

    #[rstest]
    fn test_dispatch_backup_heat(model_parameters: ModelParameters) {
        let result = dispatch(
            &CapacityVector::default(),
            &model_parameters,
            &flat_day(0.0, 10.0, 0.0),
        );
        assert_approx_eq!(
            Money,
            result.operating_cost,
            Money(24.0 * 10.0 * 1e7),
            epsilon = 1e2
        );
    }

    #[rstest]
    fn test_dispatch_gas_turbine(model_parameters: ModelParameters) {
        // Gas turbine is sized so that its heat output exactly covers the heat load
        let capacities = CapacityVector::default().with(Device::GasTurbine, 33.0);
        let result = dispatch(&capacities, &model_parameters, &flat_day(33.0, 50.0, 0.0));

        let gas = result
            .flow(Component::GasTurbine, Carrier::Gas, FlowDirection::FromBus)
            .unwrap();
        let electricity = result
            .flow(
                Component::GasTurbine,
                Carrier::Electricity,
                FlowDirection::IntoBus,
            )
            .unwrap();
        let heat = result
            .flow(Component::GasTurbine, Carrier::Heat, FlowDirection::IntoBus)
            .unwrap();
        for hour in 0..24 {
            assert_approx_eq!(f64, gas[hour], 100.0, epsilon = TOLERANCE);
            assert_approx_eq!(f64, electricity[hour], 33.0, epsilon = TOLERANCE);
            assert_approx_eq!(f64, heat[hour], 50.0, epsilon = TOLERANCE);
        }
        assert_approx_eq!(
            Money,
            result.operating_cost,
            Money(24.0 * 100.0 * 0.0286),
            epsilon = TOLERANCE
        );
    }

    fn mixed_capacities() -> CapacityVector {
        CapacityVector::new([
            200.0, 100.0, 80.0, 60.0, 40.0, 30.0, 100.0, 50.0, 50.0,
        ])
    }

    #[rstest]
    fn test_dispatch_bus_balance(model_parameters: ModelParameters, sunny_day: Vec<HourlyRecord>) {
        let result = dispatch(&mixed_capacities(), &model_parameters, &sunny_day);
        for carrier in Carrier::iter() {
            for hour in 0..24 {
                let imbalance: f64 = result
                    .iter_flows()
                    .filter(|(key, _)| key.carrier == carrier)
                    .map(|(key, values)| key.direction.sign() * values[hour])
                    .sum();
                assert!(
                    imbalance.abs() < 1e-4,
                    "{carrier} bus unbalanced in hour {hour}: {imbalance}"
                );
            }
        }
    }

    #[rstest]
    fn test_dispatch_converter_coupling(
        model_parameters: ModelParameters,
        sunny_day: Vec<HourlyRecord>,
    ) {
        let result = dispatch(&mixed_capacities(), &model_parameters, &sunny_day);
        for kind in ConverterKind::iter() {
            let table = model_parameters.converters.table(kind);
            let component = kind.into();
            let input = kind.inputs()[0];
            let reference = result
                .flow(component, input, FlowDirection::FromBus)
                .unwrap();
            let others = kind.inputs()[1..]
                .iter()
                .map(|&carrier| (carrier, FlowDirection::FromBus))
                .chain(
                    kind.outputs()
                        .iter()
                        .map(|&carrier| (carrier, FlowDirection::IntoBus)),
                );
            for (carrier, direction) in others {
                let flow = result.flow(component, carrier, direction).unwrap();
                for hour in 0..24 {
                    assert_approx_eq!(
                        f64,
                        flow[hour] / table.factor(carrier),
                        reference[hour] / table.factor(input),
                        epsilon = 1e-4
                    );
                }
            }
        }
    }

    #[rstest]
    fn test_dispatch_absorption_chiller(model_parameters: ModelParameters) {
        // The heat pump supplies the chiller's heat, so neither backup source is needed
        let capacities = CapacityVector::default()
            .with(Device::HeatPump, 100.0)
            .with(Device::AbsorptionChiller, 75.0);
        let result = dispatch(&capacities, &model_parameters, &flat_day(0.0, 0.0, 75.0));

        let flow = |carrier, direction| {
            result
                .flow(Component::AbsorptionChiller, carrier, direction)
                .unwrap()
                .to_vec()
        };
        let heat = flow(Carrier::Heat, FlowDirection::FromBus);
        let electricity = flow(Carrier::Electricity, FlowDirection::FromBus);
        let cooling = flow(Carrier::Cooling, FlowDirection::IntoBus);
        let grid = result
            .flow(Component::Grid, Carrier::Electricity, FlowDirection::IntoBus)
            .unwrap();
        let grid_expected = 98.3 / 4.44 + 1.7;
        for hour in 0..24 {
            assert_approx_eq!(f64, cooling[hour], 75.0, epsilon = TOLERANCE);
            assert_approx_eq!(f64, heat[hour], 98.3, epsilon = TOLERANCE);
            assert_approx_eq!(f64, electricity[hour], 1.7, epsilon = TOLERANCE);
            assert_approx_eq!(f64, grid[hour], grid_expected, epsilon = TOLERANCE);
        }
        assert_approx_eq!(
            Money,
            result.operating_cost,
            Money(24.0 * grid_expected * 0.1598),
            epsilon = 1e-4
        );
    }

    #[rstest]
    fn test_dispatch_storage_balance(
        model_parameters: ModelParameters,
        sunny_day: Vec<HourlyRecord>,
    ) {
        let result = dispatch(&mixed_capacities(), &model_parameters, &sunny_day);
        for kind in StorageKind::iter() {
            let component = kind.into();
            let carrier = kind.carrier();
            let parameters = model_parameters.storage.get(kind);
            let levels = result.storage_level(component).unwrap();
            let charge = result
                .flow(component, carrier, FlowDirection::FromBus)
                .unwrap();
            let discharge = result
                .flow(component, carrier, FlowDirection::IntoBus)
                .unwrap();
            assert_eq!(levels.len(), 25);

            for hour in 0..24 {
                let expected = levels[hour] * (1.0 - parameters.loss_rate.0)
                    + charge[hour] * parameters.charge_efficiency.0
                    - discharge[hour] / parameters.discharge_efficiency.0;
                assert_approx_eq!(f64, levels[hour + 1], expected, epsilon = 1e-4);
                assert!(charge[hour] <= mixed_capacities().get(kind.device()).value() + 1e-6);
            }
        }
    }

    #[rstest]
    fn test_dispatch_problem_size(model_parameters: ModelParameters, sunny_day: Vec<HourlyRecord>) {
        let network = Network::new(&mixed_capacities(), &model_parameters, &sunny_day);
        let (problem, variables) = build_dispatch_problem(&network);

        // 6 sources, 6 sinks, 10 converter flows and 2 flows per storage
        assert_eq!(variables.iter_flows().count(), 6 + 6 + 10 + 3 * 2);
        assert_eq!(
            problem.columns().len(),
            (6 + 6 + 10 + 3 * 2) * 24 + 3 * 25
        );
        assert!(
            problem
                .find_column("absorption_chiller.electricity.from_bus[0]")
                .is_some()
        );
        assert!(problem.find_column("grid.electricity.into_bus[0]").is_some());
        assert!(problem.find_column("heat_storage.level[24]").is_some());
    }

    /// A solver which always reports that the problem is infeasible
    struct InfeasibleSolver;

    impl LpSolver for InfeasibleSolver {
        fn solve(&self, _problem: &LinearProgram) -> LpSolution {
            LpSolution::failed(SolveStatus::Infeasible)
        }
    }

    #[rstest]
    fn test_dispatch_failure(model_parameters: ModelParameters, sunny_day: Vec<HourlyRecord>) {
        let network = Network::new(&mixed_capacities(), &model_parameters, &sunny_day);
        let err = perform_dispatch_optimisation(&network, &InfeasibleSolver).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not solve dispatch problem: infeasible"
        );
    }
}
