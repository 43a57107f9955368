//! The boundary with the outer multi-objective search.
//!
//! The search itself (selection, crossover, mutation, ranking) lives behind
//! [`MultiObjectiveOptimizer`]. This module only drives the generation loop: each generation is
//! evaluated in full before the optimiser is asked for the next one.
use crate::capacity::CapacityVector;
use crate::dispatch::LpSolver;
use crate::objective::ObjectivePair;
use crate::population::PopulationEvaluator;
use log::info;

/// A multi-objective optimiser proposing populations of candidates
pub trait MultiObjectiveOptimizer {
    /// The first population to evaluate
    fn initial_population(&mut self) -> Vec<CapacityVector>;

    /// Produce the next population from the last one and its objectives.
    ///
    /// `objectives[i]` belongs to `population[i]`. Returns `None` once the search has finished.
    fn next_generation(
        &mut self,
        population: &[CapacityVector],
        objectives: &[ObjectivePair],
    ) -> Option<Vec<CapacityVector>>;
}

/// The last evaluated generation of a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Number of generations evaluated
    pub num_generations: u32,
    /// The final population
    pub population: Vec<CapacityVector>,
    /// Objectives of the final population
    pub objectives: Vec<ObjectivePair>,
}

impl SearchResult {
    /// Iterate over the members of the final population which are not dominated by any other
    pub fn pareto_front(&self) -> impl Iterator<Item = (&CapacityVector, &ObjectivePair)> {
        let is_front = non_dominated(&self.objectives);
        self.population
            .iter()
            .zip(&self.objectives)
            .zip(is_front)
            .filter_map(|(pair, front)| front.then_some(pair))
    }
}

/// Run a search, evaluating every generation with `evaluator`
pub fn run_search<O, S>(optimizer: &mut O, evaluator: &PopulationEvaluator<S>) -> SearchResult
where
    O: MultiObjectiveOptimizer + ?Sized,
    S: LpSolver + ?Sized,
{
    let mut population = optimizer.initial_population();
    let mut num_generations = 0;
    loop {
        num_generations += 1;
        info!("Generation {num_generations}");
        let objectives = evaluator.evaluate(&population);

        match optimizer.next_generation(&population, &objectives) {
            Some(next) => population = next,
            None => {
                return SearchResult {
                    num_generations,
                    population,
                    objectives,
                };
            }
        }
    }
}

/// Flag the objective pairs which no other pair dominates.
///
/// Infeasible pairs are dominated by every feasible one. If all pairs are infeasible, none of
/// them is flagged.
pub fn non_dominated(objectives: &[ObjectivePair]) -> Vec<bool> {
    objectives
        .iter()
        .map(|candidate| {
            candidate.is_feasible() && !objectives.iter().any(|other| other.dominates(candidate))
        })
        .collect()
}
