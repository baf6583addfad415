//! Run configuration.
//!
//! A [`Config`] is built once at process start, from defaults or a YAML
//! file, and passed by reference to every stage of the pipeline.
//!
//! ```
//! use hah_planner::Config;
//!
//! let config = Config::from_yaml_str("num_patients: 5\nbed_capacity: 10\n").unwrap();
//! assert_eq!(config.num_patients, 5);
//! assert_eq!(config.horizon_days, 12);
//! config.validate().unwrap();
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the synthetic data generator. `None` draws a fresh one.
    pub seed: Option<u64>,
    pub num_patients: u32,
    /// Planning horizon in days; no stay may be longer.
    pub horizon_days: u32,
    /// Bed-days available to patients selected for HaH.
    pub bed_capacity: u32,
    /// Minimum supply units the selection must cover. `None` disables it.
    pub min_demand: Option<f64>,
    pub length_of_stay: Bounds<u32>,
    pub daily_demand: Bounds<f64>,
    pub demand_distribution: DemandDistribution,
    /// Share of patients eligible for HaH; the rest are high-risk.
    pub eligibility_ratio: f64,
    /// Clinical staff home visit cost per patient per day.
    pub nurse_visit_cost: f64,
    /// Procurement cost per supply unit.
    pub supply_unit_cost: f64,
    /// In-hospital treatment cost per patient per day.
    pub hospital_day_cost: f64,
}

/// Inclusive range a generated value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandDistribution {
    #[default]
    Uniform,
    /// Centered on the midpoint of the bounds, clamped into them.
    Normal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: Some(42),
            num_patients: 50,
            horizon_days: 12,
            bed_capacity: 250,
            min_demand: Some(300.0),
            length_of_stay: Bounds { min: 5, max: 12 },
            daily_demand: Bounds { min: 1.0, max: 3.0 },
            demand_distribution: DemandDistribution::Uniform,
            eligibility_ratio: 1.0,
            nurse_visit_cost: 250.0,
            supply_unit_cost: 70.0,
            hospital_day_cost: 300.0,
        }
    }
}

impl Config {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Checks every parameter and reports the first one that is out of range.
    ///
    /// A zero bed capacity is valid: it simply leaves no room for anyone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_patients == 0 {
            return invalid("num_patients must be positive");
        }
        if self.horizon_days == 0 {
            return invalid("horizon_days must be positive");
        }

        let los = self.length_of_stay;
        if los.min == 0 {
            return invalid("length_of_stay.min must be at least 1 day");
        }
        if los.min > los.max {
            return invalid(format!(
                "length_of_stay.min ({}) exceeds length_of_stay.max ({})",
                los.min, los.max
            ));
        }
        if los.max > self.horizon_days {
            return invalid(format!(
                "length_of_stay.max ({}) exceeds horizon_days ({})",
                los.max, self.horizon_days
            ));
        }

        let demand = self.daily_demand;
        if !demand.min.is_finite() || !demand.max.is_finite() {
            return invalid("daily_demand bounds must be finite");
        }
        if demand.min <= 0.0 {
            return invalid("daily_demand.min must be positive");
        }
        if demand.min > demand.max {
            return invalid(format!(
                "daily_demand.min ({}) exceeds daily_demand.max ({})",
                demand.min, demand.max
            ));
        }

        if !(0.0..=1.0).contains(&self.eligibility_ratio) {
            return invalid(format!(
                "eligibility_ratio ({}) must lie in [0, 1]",
                self.eligibility_ratio
            ));
        }

        for (name, rate) in [
            ("nurse_visit_cost", self.nurse_visit_cost),
            ("supply_unit_cost", self.supply_unit_cost),
            ("hospital_day_cost", self.hospital_day_cost),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return invalid(format!("{name} ({rate}) must be a non-negative number"));
            }
        }

        if let Some(min_demand) = self.min_demand {
            if !min_demand.is_finite() || min_demand < 0.0 {
                return invalid(format!(
                    "min_demand ({min_demand}) must be a non-negative number"
                ));
            }
        }

        Ok(())
    }

    /// Number of patients marked eligible for HaH.
    pub fn eligible_count(&self) -> usize {
        (f64::from(self.num_patients) * self.eligibility_ratio).floor() as usize
    }
}

fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(message.into()))
}
