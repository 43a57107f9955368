//! A solver-independent representation of a linear program.
//!
//! The dispatch model is assembled into a [`LinearProgram`] which is then handed to an
//! [`LpSolver`](super::LpSolver). Keeping the formulation separate from any particular solver
//! means the model can be inspected in tests and solved by stub solvers.
use std::ops::RangeInclusive;

/// A decision variable in the linear program.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(usize);

impl Variable {
    /// The column index of this variable
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A column of the linear program: one decision variable
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Human-readable name, used for debugging output
    pub name: String,
    /// Coefficient of the variable in the (minimised) objective
    pub cost: f64,
    /// Lower and upper bound on the variable
    pub bounds: RangeInclusive<f64>,
}

/// A row of the linear program: `lower <= sum(coeff * var) <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Human-readable name, used for debugging output
    pub name: String,
    /// Lower and upper bound on the row activity
    pub bounds: RangeInclusive<f64>,
    /// Variables and their coefficients
    pub terms: Vec<(Variable, f64)>,
}

/// A minimisation linear program
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LinearProgram {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl LinearProgram {
    /// Add a variable with the given objective coefficient and bounds
    pub fn add_column<S: Into<String>>(
        &mut self,
        name: S,
        cost: f64,
        bounds: RangeInclusive<f64>,
    ) -> Variable {
        self.columns.push(Column {
            name: name.into(),
            cost,
            bounds,
        });

        Variable(self.columns.len() - 1)
    }

    /// Add a constraint bounding a linear combination of variables
    pub fn add_row<S, I>(&mut self, name: S, bounds: RangeInclusive<f64>, terms: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = (Variable, f64)>,
    {
        self.rows.push(Row {
            name: name.into(),
            bounds,
            terms: terms.into_iter().collect(),
        });
    }

    /// The columns of the problem, in the order they were added
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The rows of the problem, in the order they were added
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Find a variable by name
    pub fn find_column(&self, name: &str) -> Option<Variable> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .map(Variable)
    }

    /// Evaluate the objective function for the given variable values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_linear_program() {
        let mut problem = LinearProgram::default();
        let x = problem.add_column("x", 2.0, 0.0..=10.0);
        let y = problem.add_column("y", 3.0, 0.0..=10.0);
        problem.add_row("sum", 5.0..=5.0, [(x, 1.0), (y, 1.0)]);

        assert_eq!(x.index(), 0);
        assert_eq!(y.index(), 1);
        assert_eq!(problem.columns().len(), 2);
        assert_eq!(problem.rows().len(), 1);
        assert_eq!(problem.find_column("y"), Some(y));
        assert_eq!(problem.find_column("z"), None);

        let values = [2.0, 3.0];
        assert_approx_eq!(f64, problem.objective_value(&values), 13.0);
        assert_eq!(problem.rows()[0].terms, [(x, 1.0), (y, 1.0)]);
    }
}
