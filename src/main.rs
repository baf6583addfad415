use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use hah_planner::report::{render_text, render_yaml};
use hah_planner::{Config, ConfigError, Error, GoodLpSolver, PlanOutcome, logging, plan};

#[derive(Parser)]
#[command(name = "hah-planner")]
#[command(about = "Select Hospital-at-Home patients at minimum cost", long_about = None)]
struct Cli {
    /// YAML file overriding the built-in configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seed for the synthetic patient generator
    #[arg(long)]
    seed: Option<u64>,
    /// Number of patients to generate
    #[arg(long)]
    patients: Option<u32>,
    /// Bed-days available for HaH patients
    #[arg(long)]
    beds: Option<u32>,
    /// Minimum supply units the selection must cover
    #[arg(long, conflicts_with = "no_min_demand")]
    min_demand: Option<f64>,
    /// Drop the demand-fulfillment constraint
    #[arg(long)]
    no_min_demand: bool,
    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Yaml,
}

impl Cli {
    fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(patients) = self.patients {
            config.num_patients = patients;
        }
        if let Some(beds) = self.beds {
            config.bed_capacity = beds;
        }
        if let Some(min_demand) = self.min_demand {
            config.min_demand = Some(min_demand);
        }
        if self.no_min_demand {
            config.min_demand = None;
        }
        config.validate()?;
        Ok(config)
    }
}

const EXIT_OPTIMAL: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_INFEASIBLE: u8 = 2;

/// Process exit status for the result of a planning run.
fn exit_status(result: &Result<PlanOutcome, Error>) -> u8 {
    match result {
        Ok(PlanOutcome::Optimal(_)) => EXIT_OPTIMAL,
        Ok(PlanOutcome::Infeasible) => EXIT_INFEASIBLE,
        Err(_) => EXIT_FAILURE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let result = plan(&config, &GoodLpSolver);
    match &result {
        Ok(outcome) => match cli.format {
            Format::Text => print!("{}", render_text(outcome, &config)),
            Format::Yaml => match render_yaml(outcome) {
                Ok(yaml) => print!("{}", yaml),
                Err(e) => {
                    eprintln!("Error serializing report: {}", e);
                    return ExitCode::from(EXIT_FAILURE);
                }
            },
        },
        Err(Error::Config(e)) => eprintln!("{}", e),
        Err(e) => eprintln!("Fatal: {}", e),
    }

    ExitCode::from(exit_status(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hah_planner::SolveError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hah-planner").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn no_arguments_uses_defaults() {
        let config = parse(&[]).load_config().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = [
            "--seed", "3", "--patients", "5", "--beds", "10", "--min-demand", "12.5",
        ];
        let config = parse(&args).load_config().unwrap();

        assert_eq!(config.seed, Some(3));
        assert_eq!(config.num_patients, 5);
        assert_eq!(config.bed_capacity, 10);
        assert_eq!(config.min_demand, Some(12.5));
    }

    #[test]
    fn flags_override_the_config_file() {
        let config = parse(&["--config", "configs/high_risk_mix.yaml", "--beds", "90"])
            .load_config()
            .unwrap();

        assert_eq!(config.num_patients, 40);
        assert_eq!(config.bed_capacity, 90);
    }

    #[test]
    fn no_min_demand_drops_the_floor() {
        let config = parse(&["--no-min-demand"]).load_config().unwrap();
        assert_eq!(config.min_demand, None);
    }

    #[test]
    fn min_demand_conflicts_with_no_min_demand() {
        let args = ["hah-planner", "--min-demand", "5", "--no-min-demand"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn overrides_are_validated() {
        let err = parse(&["--patients", "0"]).load_config().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn optimal_run_exits_zero() {
        let config = parse(&["--patients", "5", "--beds", "10", "--min-demand", "0"])
            .load_config()
            .unwrap();
        let result = plan(&config, &GoodLpSolver);
        assert!(matches!(result, Ok(PlanOutcome::Optimal(_))));
        assert_eq!(exit_status(&result), EXIT_OPTIMAL);
    }

    #[test]
    fn infeasible_run_exits_two() {
        let config = parse(&["--patients", "5", "--beds", "10", "--min-demand", "1000"])
            .load_config()
            .unwrap();
        let result = plan(&config, &GoodLpSolver);
        assert_eq!(result.as_ref().ok(), Some(&PlanOutcome::Infeasible));
        assert_eq!(exit_status(&result), EXIT_INFEASIBLE);
    }

    #[test]
    fn failures_exit_one() {
        let invalid = Config {
            num_patients: 0,
            ..Config::default()
        };
        let result = plan(&invalid, &GoodLpSolver);
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(exit_status(&result), EXIT_FAILURE);

        let solver_failure = Err(Error::Solve(SolveError::Backend("crashed".to_owned())));
        assert_eq!(exit_status(&solver_failure), EXIT_FAILURE);
    }
}
