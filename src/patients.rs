use std::fmt;

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, DemandDistribution};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub u32);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate for the HaH program.
///
/// `nurse_cost` and `supply_cost` are what treating the patient at home
/// would cost over the whole stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub length_of_stay: u32,
    pub daily_demand: f64,
    #[serde(default = "default_eligible")]
    pub eligible: bool,
    pub nurse_cost: f64,
    pub supply_cost: f64,
}
fn default_eligible() -> bool {
    true
}

impl Patient {
    /// Cost coefficient of selecting this patient.
    pub fn cost(&self) -> f64 {
        self.nurse_cost + self.supply_cost
    }

    pub fn bed_days(&self) -> u32 {
        self.length_of_stay
    }

    /// Supply units consumed over the stay.
    pub fn demand_units(&self) -> f64 {
        f64::from(self.length_of_stay) * self.daily_demand
    }
}

/// Generate the synthetic dataset described by `config`, drawing from `rng`.
///
/// Patients get ids `0..num_patients`. Length of stay and daily demand are
/// drawn per patient in id order, then the eligible subset is sampled
/// without replacement.
pub fn generate_patients<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Vec<Patient>, ConfigError> {
    config.validate()?;

    let los = config.length_of_stay;
    let demand = config.daily_demand;
    let normal = match config.demand_distribution {
        DemandDistribution::Uniform => None,
        DemandDistribution::Normal => {
            let mean = (demand.min + demand.max) / 2.0;
            let std_dev = (demand.max - demand.min) / 6.0;
            let normal = Normal::new(mean, std_dev)
                .map_err(|e| ConfigError::Invalid(format!("daily_demand distribution: {e}")))?;
            Some(normal)
        }
    };

    let mut patients: Vec<Patient> = (0..config.num_patients)
        .map(|i| {
            let length_of_stay = rng.random_range(los.min..=los.max);
            let daily_demand = match &normal {
                None => rng.random_range(demand.min..=demand.max),
                Some(normal) => normal.sample(rng).clamp(demand.min, demand.max),
            };
            let days = f64::from(length_of_stay);

            Patient {
                id: PatientId(i),
                length_of_stay,
                daily_demand,
                eligible: false,
                nurse_cost: days * config.nurse_visit_cost,
                supply_cost: days * daily_demand * config.supply_unit_cost,
            }
        })
        .collect();

    let eligible = config.eligible_count();
    for i in index::sample(rng, patients.len(), eligible) {
        patients[i].eligible = true;
    }

    debug!(
        patients = patients.len(),
        eligible,
        bed_days = patients.iter().map(|p| u64::from(p.bed_days())).sum::<u64>(),
        "generated synthetic patients"
    );
    Ok(patients)
}

/// Generate the dataset from `config.seed`, or from a freshly drawn seed
/// that is logged so the run can be reproduced.
pub fn generate_seeded(config: &Config) -> Result<Vec<Patient>, ConfigError> {
    let seed = match config.seed {
        Some(seed) => seed,
        None => {
            let seed: u64 = rand::rng().random();
            info!(seed, "no seed configured, drew a fresh one");
            seed
        }
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_patients(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bounds;
    use proptest::prelude::*;

    fn config_strategy() -> impl Strategy<Value = (Config, u64)> {
        (
            1u32..200,
            1u32..10,
            0u32..10,
            0.1f64..5.0,
            0.0f64..5.0,
            0.0f64..=1.0,
            any::<bool>(),
            any::<u64>(),
        )
            .prop_map(
                |(num_patients, los_min, los_span, demand_min, demand_span, ratio, normal, seed)| {
                    let config = Config {
                        seed: Some(seed),
                        num_patients,
                        horizon_days: los_min + los_span,
                        length_of_stay: Bounds {
                            min: los_min,
                            max: los_min + los_span,
                        },
                        daily_demand: Bounds {
                            min: demand_min,
                            max: demand_min + demand_span,
                        },
                        demand_distribution: if normal {
                            DemandDistribution::Normal
                        } else {
                            DemandDistribution::Uniform
                        },
                        eligibility_ratio: ratio,
                        ..Config::default()
                    };
                    (config, seed)
                },
            )
    }

    proptest! {
        #[test]
        fn generates_configured_count_within_bounds((config, seed) in config_strategy()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let patients = generate_patients(&config, &mut rng).unwrap();

            prop_assert_eq!(patients.len(), config.num_patients as usize);
            for (i, patient) in patients.iter().enumerate() {
                prop_assert_eq!(patient.id, PatientId(i as u32));
                prop_assert!(patient.length_of_stay >= config.length_of_stay.min);
                prop_assert!(patient.length_of_stay <= config.length_of_stay.max);
                prop_assert!(patient.daily_demand >= config.daily_demand.min);
                prop_assert!(patient.daily_demand <= config.daily_demand.max);
            }
            prop_assert_eq!(
                patients.iter().filter(|p| p.eligible).count(),
                config.eligible_count()
            );
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let config = Config {
            num_patients: 20,
            ..Config::default()
        };
        let first = generate_seeded(&config).unwrap();
        let second = generate_seeded(&config).unwrap();
        assert_eq!(first, second);

        let other = generate_seeded(&Config {
            seed: Some(43),
            ..config
        })
        .unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn costs_follow_configured_rates() {
        let config = Config {
            num_patients: 10,
            ..Config::default()
        };
        for patient in generate_seeded(&config).unwrap() {
            let days = f64::from(patient.length_of_stay);
            assert_eq!(patient.nurse_cost, days * config.nurse_visit_cost);
            assert!((patient.supply_cost - patient.demand_units() * config.supply_unit_cost).abs() < 1e-9);
            assert_eq!(patient.cost(), patient.nurse_cost + patient.supply_cost);
        }
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = Config {
            num_patients: 0,
            ..Config::default()
        };
        let err = generate_seeded(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unseeded_generation_still_respects_count() {
        let config = Config {
            seed: None,
            num_patients: 8,
            ..Config::default()
        };
        assert_eq!(generate_seeded(&config).unwrap().len(), 8);
    }
}
