use std::fmt;

use crate::config::Config;
use crate::{Plan, PlanOutcome};

/// Human-readable summary of a planning run.
pub fn render_text(outcome: &PlanOutcome, config: &Config) -> String {
    match outcome {
        PlanOutcome::Optimal(plan) => PlanSummary { plan, config }.to_string(),
        PlanOutcome::Infeasible => "Status: INFEASIBLE\n\
             No feasible solution: no selection of patients meets the demand \
             minimum within the bed capacity.\n"
            .to_owned(),
    }
}

pub fn render_yaml(outcome: &PlanOutcome) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(outcome)
}

struct PlanSummary<'a> {
    plan: &'a Plan,
    config: &'a Config,
}

impl fmt::Display for PlanSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;
        let ids: Vec<String> = plan.selected.iter().map(ToString::to_string).collect();

        writeln!(f, "Status: OPTIMAL")?;
        writeln!(f, "Total cost: {:.2}", plan.total_cost)?;
        writeln!(f)?;
        writeln!(
            f,
            "Patients selected for HaH: {} of {}",
            plan.selected.len(),
            plan.candidates
        )?;
        writeln!(f, "HaH patient IDs: [{}]", ids.join(", "))?;
        writeln!(
            f,
            "Bed-days used: {} / {}",
            plan.bed_days_used, self.config.bed_capacity
        )?;
        match self.config.min_demand {
            Some(min_demand) => writeln!(
                f,
                "Demand fulfilled: {:.2} (minimum {:.2})",
                plan.demand_fulfilled, min_demand
            )?,
            None => writeln!(f, "Demand fulfilled: {:.2}", plan.demand_fulfilled)?,
        }
        writeln!(f)?;
        writeln!(f, "Cost breakdown:")?;
        writeln!(f, "  {:20} {:12.2}", "Nurse visits", plan.breakdown.nurse_visits)?;
        writeln!(f, "  {:20} {:12.2}", "Supplies", plan.breakdown.supplies)?;
        writeln!(
            f,
            "Inpatient cost avoided: {:.2}",
            plan.inpatient_cost_avoided
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CostBreakdown, PatientId};

    fn sample_plan() -> Plan {
        Plan {
            candidates: 4,
            selected: vec![PatientId(1), PatientId(3)],
            total_cost: 640.0,
            bed_days_used: 5,
            demand_fulfilled: 22.0,
            breakdown: CostBreakdown {
                nurse_visits: 500.0,
                supplies: 140.0,
            },
            inpatient_cost_avoided: 1500.0,
        }
    }

    #[test]
    fn optimal_report_lists_cost_and_patients() {
        let config = Config {
            num_patients: 50,
            bed_capacity: 10,
            min_demand: Some(20.0),
            ..Config::default()
        };
        let text = render_text(&PlanOutcome::Optimal(sample_plan()), &config);

        assert!(text.starts_with("Status: OPTIMAL\n"));
        assert!(text.contains("Total cost: 640.00\n"));
        assert!(text.contains("Patients selected for HaH: 2 of 4\n"));
        assert!(text.contains("HaH patient IDs: [1, 3]\n"));
        assert!(text.contains("Bed-days used: 5 / 10\n"));
        assert!(text.contains("Demand fulfilled: 22.00 (minimum 20.00)\n"));
        assert!(text.contains("Inpatient cost avoided: 1500.00\n"));
    }

    #[test]
    fn infeasible_report_is_distinct() {
        let text = render_text(&PlanOutcome::Infeasible, &Config::default());
        assert!(text.starts_with("Status: INFEASIBLE\n"));
        assert!(text.contains("No feasible solution"));
        assert!(!text.contains("Total cost"));
    }

    #[test]
    fn yaml_report_is_tagged_by_status() {
        let yaml = render_yaml(&PlanOutcome::Optimal(sample_plan())).unwrap();
        assert!(yaml.starts_with("status: optimal\n"));
        assert!(yaml.contains("selected:\n- 1\n- 3\n"));

        let parsed: PlanOutcome = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, PlanOutcome::Optimal(sample_plan()));

        let yaml = render_yaml(&PlanOutcome::Infeasible).unwrap();
        assert_eq!(yaml.trim(), "status: infeasible");
    }
}
