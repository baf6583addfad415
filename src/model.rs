use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::ModelError;
use crate::patients::{Patient, PatientId};

/// Tolerance used when checking a rounded assignment against the model.
const FEASIBILITY_EPSILON: f64 = 1e-6;

/// Binary selection of a patient for HaH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionVariable {
    pub patient: PatientId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficient for each variable, in variable order
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl LinearConstraint {
    /// Left-hand side evaluated at `values`.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coefficient, value)| coefficient * value)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.activity(values);
        match self.op {
            ConstraintOp::Le => lhs <= self.rhs + FEASIBILITY_EPSILON,
            ConstraintOp::Ge => lhs >= self.rhs - FEASIBILITY_EPSILON,
            ConstraintOp::Eq => (lhs - self.rhs).abs() <= FEASIBILITY_EPSILON,
        }
    }
}

/// Cost-minimizing HaH selection program, independent of any solver.
///
/// Variables are binary and appear in the same order as the patients the
/// model was built from; objective and constraint coefficients are indexed
/// the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionModel {
    pub variables: Vec<DecisionVariable>,
    /// Cost coefficient for each variable (minimized)
    pub objective: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl SelectionModel {
    /// Formulate the selection program for `patients`.
    ///
    /// The model always carries the bed capacity constraint; the demand
    /// floor is added only when `config.min_demand` is set, and every
    /// ineligible patient is pinned to zero.
    pub fn build(patients: &[Patient], config: &Config) -> Result<Self, ModelError> {
        if patients.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        check_patients(patients)?;

        let variables = create_variables(patients);
        let objective = patients.iter().map(Patient::cost).collect();

        let mut constraints = vec![constrain_bed_capacity(patients, config.bed_capacity)];
        if let Some(min_demand) = config.min_demand {
            constraints.push(constrain_demand_fulfillment(patients, min_demand));
        }
        constraints.extend(constrain_ineligible_patients(patients));

        let model = Self {
            variables,
            objective,
            constraints,
        };
        debug!(
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "built selection model"
        );
        Ok(model)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(cost, value)| cost * value)
            .sum()
    }

    /// Whether the 0/1 assignment `selection` satisfies every constraint.
    ///
    /// A selection of the wrong length is never feasible.
    pub fn is_feasible(&self, selection: &[bool]) -> bool {
        matches!(self.violated_constraint(selection), Ok(None))
    }

    /// The first constraint `selection` breaks, if any.
    pub fn violated_constraint(
        &self,
        selection: &[bool],
    ) -> Result<Option<&LinearConstraint>, ModelError> {
        if selection.len() != self.variables.len() {
            return Err(ModelError::SelectionLength {
                expected: self.variables.len(),
                actual: selection.len(),
            });
        }
        let values: Vec<f64> = selection
            .iter()
            .map(|&selected| if selected { 1.0 } else { 0.0 })
            .collect();
        Ok(self.constraints.iter().find(|c| !c.is_satisfied(&values)))
    }
}

/// Reject data no selection model can be built from
fn check_patients(patients: &[Patient]) -> Result<(), ModelError> {
    let mut seen = HashSet::with_capacity(patients.len());
    for patient in patients {
        let invalid = |message: String| Err(ModelError::InvalidPatient(patient.id, message));

        if !seen.insert(patient.id) {
            return invalid("duplicate patient id".to_owned());
        }
        if patient.length_of_stay == 0 {
            return invalid("length_of_stay must be at least 1 day".to_owned());
        }
        if !patient.daily_demand.is_finite() || patient.daily_demand <= 0.0 {
            return invalid(format!(
                "daily_demand ({}) must be a positive number",
                patient.daily_demand
            ));
        }
        for (name, cost) in [
            ("nurse_cost", patient.nurse_cost),
            ("supply_cost", patient.supply_cost),
        ] {
            if !cost.is_finite() || cost < 0.0 {
                return invalid(format!("{name} ({cost}) must be a non-negative number"));
            }
        }
    }
    Ok(())
}

fn create_variables(patients: &[Patient]) -> Vec<DecisionVariable> {
    patients
        .iter()
        .map(|patient| DecisionVariable {
            patient: patient.id,
            name: format!("x_{}", patient.id),
        })
        .collect()
}

/// Bed-days taken by the selected patients may not exceed the capacity
fn constrain_bed_capacity(patients: &[Patient], bed_capacity: u32) -> LinearConstraint {
    LinearConstraint {
        name: "bed_capacity".to_owned(),
        coefficients: patients.iter().map(|p| f64::from(p.bed_days())).collect(),
        op: ConstraintOp::Le,
        rhs: f64::from(bed_capacity),
    }
}

/// Supply units covered by the selected patients must reach the minimum
fn constrain_demand_fulfillment(patients: &[Patient], min_demand: f64) -> LinearConstraint {
    LinearConstraint {
        name: "demand_fulfillment".to_owned(),
        coefficients: patients.iter().map(Patient::demand_units).collect(),
        op: ConstraintOp::Ge,
        rhs: min_demand,
    }
}

/// High-risk patients stay in hospital
fn constrain_ineligible_patients(patients: &[Patient]) -> impl Iterator<Item = LinearConstraint> {
    let n = patients.len();
    patients
        .iter()
        .enumerate()
        .filter(|(_, patient)| !patient.eligible)
        .map(move |(i, patient)| {
            let mut coefficients = vec![0.0; n];
            coefficients[i] = 1.0;
            LinearConstraint {
                name: format!("ineligible_{}", patient.id),
                coefficients,
                op: ConstraintOp::Eq,
                rhs: 0.0,
            }
        })
}
