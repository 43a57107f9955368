//! The two objectives by which candidates are ranked.
use crate::capacity::CapacityVector;
use crate::dispatch::{DispatchResult, LpSolver, Network, perform_dispatch_optimisation};
use crate::model::Model;
use crate::net_load::NetLoad;
use crate::units::{Dimensionless, Money};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

/// Economic cost and complementarity metric of a candidate. Both are to be minimised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectivePair {
    /// Annualised investment cost plus annual operating cost
    pub economic: f64,
    /// Sum of the standard deviations of the net-exchange series
    pub complementarity: f64,
}

impl ObjectivePair {
    /// The value given to candidates whose evaluation failed
    pub const INFEASIBLE: Self = Self {
        economic: f64::INFINITY,
        complementarity: f64::INFINITY,
    };

    /// Whether the evaluation succeeded
    pub fn is_feasible(&self) -> bool {
        self.economic.is_finite() && self.complementarity.is_finite()
    }

    /// Whether this pair Pareto-dominates `other`: no worse in both objectives and strictly
    /// better in at least one
    pub fn dominates(&self, other: &Self) -> bool {
        self.economic <= other.economic
            && self.complementarity <= other.complementarity
            && (self.economic < other.economic || self.complementarity < other.complementarity)
    }
}

/// Full result of a successful evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The objective values
    pub objectives: ObjectivePair,
    /// Annualised investment cost, including connection charges
    pub investment_cost: Money,
    /// Operating cost over the horizon (day costs weighted by cluster size)
    pub operating_cost: Money,
    /// Net-exchange series over the horizon
    pub net_load: NetLoad,
    /// Solved dispatch for each typical day, keyed by typical day ID
    pub dispatch: IndexMap<u32, DispatchResult>,
}

/// Evaluate a candidate, keeping the dispatch of every typical day.
///
/// Typical days are solved in input order. The first day which fails to solve aborts the
/// evaluation.
///
/// # Arguments
///
/// * `model` - The model
/// * `solver` - Solver for the dispatch problems
/// * `capacities` - The candidate
pub fn evaluate_candidate_detailed<S: LpSolver + ?Sized>(
    model: &Model,
    solver: &S,
    capacities: &CapacityVector,
) -> Result<Evaluation> {
    let mut operating_cost = Money(0.0);
    let mut net_load = NetLoad::new(model.num_days());
    let mut dispatch = IndexMap::new();
    for typical_day in model.typical_days.iter() {
        let day = model
            .operation_data
            .day(typical_day.id)
            .with_context(|| format!("No operation data for typical day {}", typical_day.id))?;
        let network = Network::new(capacities, &model.parameters, day);
        let result = perform_dispatch_optimisation(&network, solver)
            .with_context(|| format!("Dispatch failed for typical day {}", typical_day.id))?;

        operating_cost += result.operating_cost * Dimensionless(typical_day.weight() as f64);
        net_load.insert_typical_day(typical_day, &result)?;
        dispatch.insert(typical_day.id, result);
    }

    let investment_cost = model.parameters.costs.investment_cost(capacities);
    let objectives = ObjectivePair {
        economic: (investment_cost + operating_cost).value(),
        complementarity: net_load.complementarity(),
    };

    Ok(Evaluation {
        objectives,
        investment_cost,
        operating_cost,
        net_load,
        dispatch,
    })
}

/// Evaluate the objectives of a candidate.
///
/// If evaluation fails, a warning is logged and [`ObjectivePair::INFEASIBLE`] is returned.
pub fn evaluate_candidate<S: LpSolver + ?Sized>(
    model: &Model,
    solver: &S,
    capacities: &CapacityVector,
) -> ObjectivePair {
    match evaluate_candidate_detailed(model, solver, capacities) {
        Ok(evaluation) => {
            debug!(
                "Candidate {:?}: economic = {}, complementarity = {}",
                capacities.values(),
                evaluation.objectives.economic,
                evaluation.objectives.complementarity
            );
            evaluation.objectives
        }
        Err(err) => {
            warn!("Candidate {:?} is infeasible: {err:#}", capacities.values());
            ObjectivePair::INFEASIBLE
        }
    }
}
