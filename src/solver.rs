use good_lp::Solution as LpSolution;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, SolverModel, Variable, variable, variables,
};
use tracing::debug;

use crate::error::SolveError;
use crate::model::{ConstraintOp, LinearConstraint, SelectionModel};

/// What a solver reports for a [`SelectionModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Value of each variable at the optimum, in variable order.
    Optimal { values: Vec<f64> },
    Infeasible,
}

/// Anything that can solve a linear selection model.
pub trait LinearSolver {
    fn solve(&self, model: &SelectionModel) -> Result<SolveOutcome, SolveError>;
}

/// [`LinearSolver`] backed by `good_lp`.
///
/// Uses the pure-Rust microlp backend, or COIN-OR CBC when the `cbc`
/// feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl LinearSolver for GoodLpSolver {
    fn solve(&self, model: &SelectionModel) -> Result<SolveOutcome, SolveError> {
        let (problem_vars, selection_vars) = init_variables(model);
        let objective = create_objective_function(&model.objective, &selection_vars);
        let lp = create_model(problem_vars, objective);
        let lp = add_constraints(lp, &model.constraints, &selection_vars);

        debug!(
            backend = BACKEND,
            variables = selection_vars.len(),
            constraints = model.constraints.len(),
            "solving selection model"
        );
        match lp.solve() {
            Ok(solution) => Ok(SolveOutcome::Optimal {
                values: selection_vars.iter().map(|&v| solution.value(v)).collect(),
            }),
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome::Infeasible),
            Err(e) => Err(SolveError::Backend(e.to_string())),
        }
    }
}

#[cfg(feature = "cbc")]
const BACKEND: &str = "coin_cbc";
#[cfg(not(feature = "cbc"))]
const BACKEND: &str = "microlp";

fn init_variables(model: &SelectionModel) -> (ProblemVariables, Vec<Variable>) {
    let mut problem_vars = variables!();
    let selection_vars = model
        .variables
        .iter()
        .map(|v| problem_vars.add(variable().binary().name(v.name.clone())))
        .collect();
    (problem_vars, selection_vars)
}

fn linear_expression(coefficients: &[f64], vars: &[Variable]) -> Expression {
    coefficients
        .iter()
        .zip(vars)
        .filter(|&(&coefficient, _)| coefficient != 0.0)
        .fold(Expression::from(0.0), |sum, (&coefficient, &var)| {
            sum + var * coefficient
        })
}

fn create_objective_function(costs: &[f64], vars: &[Variable]) -> Expression {
    linear_expression(costs, vars)
}

/// Create a minimization model with the given objective function
#[cfg(feature = "cbc")]
fn create_model(
    variables: ProblemVariables,
    objective: Expression,
) -> impl SolverModel<Error = ResolutionError> {
    let mut model = variables
        .minimise(objective)
        .using(good_lp::solvers::coin_cbc::coin_cbc);
    model.set_parameter("loglevel", "0");
    model
}

/// Create a minimization model with the given objective function
#[cfg(not(feature = "cbc"))]
fn create_model(
    variables: ProblemVariables,
    objective: Expression,
) -> impl SolverModel<Error = ResolutionError> {
    variables
        .minimise(objective)
        .using(good_lp::solvers::microlp::microlp)
}

/// Add every linear constraint of the selection model to the solver model
fn add_constraints<Model: SolverModel>(
    model: Model,
    constraints: &[LinearConstraint],
    vars: &[Variable],
) -> Model {
    constraints.iter().fold(model, |m, c| {
        let lhs = linear_expression(&c.coefficients, vars);
        let constraint = match c.op {
            ConstraintOp::Le => lhs.leq(c.rhs),
            ConstraintOp::Ge => lhs.geq(c.rhs),
            ConstraintOp::Eq => lhs.eq(c.rhs),
        };
        m.with(constraint)
    })
}
