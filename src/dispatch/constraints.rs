//! Code for adding constraints to the dispatch optimisation problem.
use super::network::{FlowDirection, Network, SinkProfile, SourceProfile};
use super::problem::{LinearProgram, Variable};
use super::VariableMap;
use crate::carrier::Carrier;
use strum::IntoEnumIterator;

/// Add all constraints of the dispatch model.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `network` - The network being dispatched
pub fn add_dispatch_constraints(
    problem: &mut LinearProgram,
    variables: &VariableMap,
    network: &Network,
) {
    add_bus_balance_constraints(problem, variables, network.num_hours);
    add_fixed_profile_constraints(problem, variables, network);
    add_converter_coupling_constraints(problem, variables, network);
    add_storage_balance_constraints(problem, variables, network);
}

/// Add a balance constraint for every bus and hour: inflows minus outflows equal zero.
///
/// Buses are created for every carrier, so a bus with no attached flows simply gives empty rows.
fn add_bus_balance_constraints(
    problem: &mut LinearProgram,
    variables: &VariableMap,
    num_hours: usize,
) {
    for carrier in Carrier::iter() {
        for hour in 0..num_hours {
            let terms: Vec<_> = variables
                .iter_flows()
                .filter(|(key, _)| key.carrier == carrier)
                .map(|(key, vars)| (vars[hour], key.direction.sign()))
                .collect();
            if terms.is_empty() {
                continue;
            }

            problem.add_row(format!("balance.{carrier}[{hour}]"), 0.0..=0.0, terms);
        }
    }
}

/// Fix renewable outputs and demands to their hourly profiles.
///
/// These are equality constraints rather than variable bounds, so they appear as rows.
fn add_fixed_profile_constraints(
    problem: &mut LinearProgram,
    variables: &VariableMap,
    network: &Network,
) {
    let sources = network.sources.iter().filter_map(|source| match &source.profile {
        SourceProfile::Fixed(profile) => Some((
            variables.flow_vars(source.component, source.carrier, FlowDirection::IntoBus),
            profile,
        )),
        SourceProfile::Priced(_) => None,
    });
    let sinks = network.sinks.iter().filter_map(|sink| match &sink.profile {
        SinkProfile::Fixed(profile) => Some((
            variables.flow_vars(sink.component, sink.carrier, FlowDirection::FromBus),
            profile,
        )),
        SinkProfile::Overflow => None,
    });

    for (vars, profile) in sources.chain(sinks) {
        add_equality_rows(problem, vars, profile);
    }
}

fn add_equality_rows(problem: &mut LinearProgram, vars: &[Variable], profile: &[f64]) {
    for (&var, &value) in vars.iter().zip(profile) {
        let name = format!("{}.fixed", problem.columns()[var.index()].name);
        problem.add_row(name, value..=value, [(var, 1.0)]);
    }
}

/// Tie every flow of a converter to its reference flow.
///
/// For each attached carrier `c` and reference carrier `r` (the first input):
/// `flow[c] / factor[c] - flow[r] / factor[r] = 0`.
fn add_converter_coupling_constraints(
    problem: &mut LinearProgram,
    variables: &VariableMap,
    network: &Network,
) {
    for converter in &network.converters {
        let component = converter.kind.into();
        let reference = converter.kind.inputs()[0];
        let reference_vars = variables.flow_vars(component, reference, FlowDirection::FromBus);
        let reference_factor = converter.factors.factor(reference);

        let others = converter
            .kind
            .inputs()
            .iter()
            .skip(1)
            .map(|&carrier| (carrier, FlowDirection::FromBus))
            .chain(
                converter
                    .kind
                    .outputs()
                    .iter()
                    .map(|&carrier| (carrier, FlowDirection::IntoBus)),
            );
        for (carrier, direction) in others {
            let vars = variables.flow_vars(component, carrier, direction);
            let factor = converter.factors.factor(carrier);
            for (hour, (&var, &reference_var)) in vars.iter().zip(reference_vars).enumerate() {
                problem.add_row(
                    format!("{component}.{carrier}.coupling[{hour}]"),
                    0.0..=0.0,
                    [(var, 1.0 / factor), (reference_var, -1.0 / reference_factor)],
                );
            }
        }
    }
}

/// Add the energy balance of every storage.
///
/// `level[t+1] - (1 - loss) * level[t] - charge_eff * charge[t] + discharge[t] / discharge_eff = 0`
/// where `level[0]` is the (free) level at the start of the day.
fn add_storage_balance_constraints(
    problem: &mut LinearProgram,
    variables: &VariableMap,
    network: &Network,
) {
    for storage in &network.storages {
        let component = storage.kind.into();
        let carrier = storage.kind.carrier();
        let parameters = &storage.parameters;
        let levels = variables.level_vars(component);
        let charge = variables.flow_vars(component, carrier, FlowDirection::FromBus);
        let discharge = variables.flow_vars(component, carrier, FlowDirection::IntoBus);

        for hour in 0..network.num_hours {
            problem.add_row(
                format!("{component}.level[{hour}]"),
                0.0..=0.0,
                [
                    (levels[hour + 1], 1.0),
                    (levels[hour], -(1.0 - parameters.loss_rate.0)),
                    (charge[hour], -parameters.charge_efficiency.0),
                    (discharge[hour], 1.0 / parameters.discharge_efficiency.0),
                ],
            );
        }
    }
}
