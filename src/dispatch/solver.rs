//! The boundary between the dispatch model and linear programming solvers.
use super::problem::LinearProgram;
use highs::{HighsModelStatus, RowProblem, Sense};
use std::fmt;

/// Outcome of a solve
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem has no feasible solution
    Infeasible,
    /// The solver failed or stopped without an optimal solution
    Error(String),
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::Error(msg) => write!(f, "solver error: {msg}"),
        }
    }
}

/// The result of solving a [`LinearProgram`]
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// Solve status
    pub status: SolveStatus,
    /// Value of every column, in column order. Only meaningful if the status is optimal.
    pub values: Vec<f64>,
    /// Objective value. Only meaningful if the status is optimal.
    pub objective_value: f64,
}

impl LpSolution {
    /// An optimal solution with the given column values
    pub fn optimal(problem: &LinearProgram, values: Vec<f64>) -> Self {
        let objective_value = problem.objective_value(&values);
        Self {
            status: SolveStatus::Optimal,
            values,
            objective_value,
        }
    }

    /// A solution carrying only a failure status
    pub fn failed(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: f64::NAN,
        }
    }
}

/// Something which can solve a linear program (minimisation).
///
/// Solvers are shared between evaluation workers, so must be [`Sync`]. A solver must not keep
/// state between calls: the same problem must always give the same solution.
pub trait LpSolver: Sync {
    /// Solve the problem
    fn solve(&self, problem: &LinearProgram) -> LpSolution;
}

/// Solves problems with the HiGHS solver
#[derive(Debug, Default, Clone, Copy)]
pub struct HighsSolver;

impl LpSolver for HighsSolver {
    fn solve(&self, problem: &LinearProgram) -> LpSolution {
        let mut highs_problem = RowProblem::default();
        let cols: Vec<_> = problem
            .columns()
            .iter()
            .map(|column| highs_problem.add_column(column.cost, column.bounds.clone()))
            .collect();
        for row in problem.rows() {
            highs_problem.add_row(
                row.bounds.clone(),
                row.terms.iter().map(|(var, coeff)| (cols[var.index()], *coeff)),
            );
        }

        let mut highs_model = highs_problem.optimise(Sense::Minimise);
        highs_model.set_option("output_flag", false);

        // Candidates are evaluated in parallel, so each solve gets a single thread
        highs_model.set_option("threads", 1_i32);

        let solved = match highs_model.try_solve() {
            Ok(solved) => solved,
            Err(status) => return LpSolution::failed(SolveStatus::Error(format!("{status:?}"))),
        };

        match solved.status() {
            HighsModelStatus::Optimal => {
                LpSolution::optimal(problem, solved.get_solution().columns().to_vec())
            }
            HighsModelStatus::Infeasible => LpSolution::failed(SolveStatus::Infeasible),
            status => LpSolution::failed(SolveStatus::Error(format!("{status:?}"))),
        }
    }
}
