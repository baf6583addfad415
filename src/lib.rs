pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod patients;
pub mod report;
pub mod solver;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use config::{Bounds, Config, DemandDistribution};
pub use error::{ConfigError, Error, ModelError, SolveError};
pub use model::{ConstraintOp, DecisionVariable, LinearConstraint, SelectionModel};
pub use patients::{Patient, PatientId, generate_patients, generate_seeded};
pub use solver::{GoodLpSolver, LinearSolver, SolveOutcome};

/// Result of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    Optimal(Plan),
    /// No selection satisfies capacity, demand and eligibility together.
    Infeasible,
}

/// Patients selected for HaH and what the selection costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Size of the dataset the selection was made from
    pub candidates: usize,
    /// Selected patient ids, ascending
    pub selected: Vec<PatientId>,
    pub total_cost: f64,
    pub bed_days_used: u32,
    pub demand_fulfilled: f64,
    pub breakdown: CostBreakdown,
    /// What the selected patients would have cost as inpatients.
    ///
    /// Approximated from the home stay: the dataset carries no separate
    /// in-hospital length of stay.
    pub inpatient_cost_avoided: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub nurse_visits: f64,
    pub supplies: f64,
}

/// Generate the synthetic dataset for `config` and plan over it.
pub fn plan<S: LinearSolver + ?Sized>(config: &Config, solver: &S) -> Result<PlanOutcome, Error> {
    let patients = generate_seeded(config)?;
    info!(patients = patients.len(), "generated patient dataset");
    plan_for(&patients, config, solver)
}

/// Build the selection model for `patients`, solve it and extract the plan.
pub fn plan_for<S: LinearSolver + ?Sized>(
    patients: &[Patient],
    config: &Config,
    solver: &S,
) -> Result<PlanOutcome, Error> {
    config.validate()?;
    let model = SelectionModel::build(patients, config)?;
    info!(
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        "selection model ready"
    );

    let values = match solver.solve(&model)? {
        SolveOutcome::Optimal { values } => values,
        SolveOutcome::Infeasible => {
            warn!("selection model is infeasible");
            return Ok(PlanOutcome::Infeasible);
        }
    };
    if values.len() != model.num_variables() {
        return Err(SolveError::InvalidSolution(format!(
            "expected {} variable values, got {}",
            model.num_variables(),
            values.len()
        ))
        .into());
    }

    let selection: Vec<bool> = values.iter().map(|&v| v > 0.5).collect();
    if let Some(violated) = model.violated_constraint(&selection)? {
        return Err(SolveError::InvalidSolution(format!(
            "rounded selection violates {}",
            violated.name
        ))
        .into());
    }

    let plan = create_plan(patients, config, &selection);
    info!(
        selected = plan.selected.len(),
        total_cost = plan.total_cost,
        "found optimal selection"
    );
    Ok(PlanOutcome::Optimal(plan))
}

/// Summarize the selected patients
fn create_plan(patients: &[Patient], config: &Config, selection: &[bool]) -> Plan {
    let chosen: Vec<&Patient> = patients
        .iter()
        .zip(selection)
        .filter_map(|(patient, &selected)| selected.then_some(patient))
        .collect();

    let mut selected: Vec<PatientId> = chosen.iter().map(|p| p.id).collect();
    selected.sort();

    let bed_days_used: u32 = chosen.iter().map(|p| p.bed_days()).sum();
    let breakdown = CostBreakdown {
        nurse_visits: total(chosen.iter().map(|p| p.nurse_cost)),
        supplies: total(chosen.iter().map(|p| p.supply_cost)),
    };

    Plan {
        candidates: patients.len(),
        selected,
        total_cost: total(chosen.iter().map(|p| p.cost())),
        bed_days_used,
        demand_fulfilled: total(chosen.iter().map(|p| p.demand_units())),
        breakdown,
        inpatient_cost_avoided: f64::from(bed_days_used) * config.hospital_day_cost,
    }
}

// Empty selections sum to +0.0, which `Iterator::sum` does not guarantee.
fn total(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |sum, value| sum + value)
}
