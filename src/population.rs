//! Evaluation of a whole population of candidates.
use crate::capacity::CapacityVector;
use crate::dispatch::LpSolver;
use crate::executor::TaskExecutor;
use crate::model::Model;
use crate::objective::{Evaluation, ObjectivePair, evaluate_candidate, evaluate_candidate_detailed};
use anyhow::Result;
use log::info;

/// Evaluates populations of candidates in parallel against one model.
///
/// Every candidate is evaluated independently; tasks share only read-only data.
pub struct PopulationEvaluator<'a, S: ?Sized> {
    model: &'a Model,
    solver: &'a S,
    executor: &'a TaskExecutor,
}

impl<'a, S: LpSolver + ?Sized> PopulationEvaluator<'a, S> {
    /// Create a new [`PopulationEvaluator`]
    pub fn new(model: &'a Model, solver: &'a S, executor: &'a TaskExecutor) -> Self {
        Self {
            model,
            solver,
            executor,
        }
    }

    /// Evaluate the objectives of every candidate.
    ///
    /// Element `i` of the result belongs to candidate `i`. Candidates which fail to evaluate get
    /// [`ObjectivePair::INFEASIBLE`] and do not affect the others.
    pub fn evaluate(&self, population: &[CapacityVector]) -> Vec<ObjectivePair> {
        info!(
            "Evaluating {} candidates on {} worker threads",
            population.len(),
            self.executor.num_threads()
        );
        let objectives = self.executor.map_ordered(population, |capacities| {
            evaluate_candidate(self.model, self.solver, capacities)
        });

        let num_infeasible = objectives.iter().filter(|obj| !obj.is_feasible()).count();
        info!(
            "Evaluated {} candidates ({num_infeasible} infeasible)",
            objectives.len()
        );

        objectives
    }

    /// Evaluate every candidate, keeping the full evaluation or the reason for failure
    pub fn evaluate_detailed(&self, population: &[CapacityVector]) -> Vec<Result<Evaluation>> {
        self.executor.map_ordered(population, |capacities| {
            evaluate_candidate_detailed(self.model, self.solver, capacities)
        })
    }
}
