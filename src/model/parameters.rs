//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{deserialise_proportion, input_err_msg, is_unique, read_toml};
use crate::units::{Dimensionless, MoneyPerEmissions, UnitSystem};
use crate::year::{Horizon, LinearPath};
use crate::zone::ZoneID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use log::warn;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// The longest a single scenario may be given to solve (one week)
const MAX_SOLVER_TIMEOUT_SECONDS: f64 = 7.0 * 24.0 * 3600.0;

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_discount_rate, Dimensionless, 0.1);
define_unit_param_default!(default_renewable_tolerance, Dimensionless, 0.01);
define_unit_param_default!(default_learning_tolerance, Dimensionless, 1e-3);
define_param_default!(default_hours_per_year, f64, 8760.0);
define_param_default!(default_max_learning_iterations, u32, 20);
define_param_default!(default_solver_timeout_seconds, f64, 300.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The first (historical) year of the horizon
    pub base_year: u32,
    /// Number of years modelled after the base year
    pub horizon_years: u32,
    /// Annual discount rate applied to all costs
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Dimensionless,
    /// Ratio of average to peak demand
    pub load_factor: Dimensionless,
    /// Number of hours in a year
    #[serde(default = "default_hours_per_year")]
    pub hours_per_year: f64,
    /// Planning reserve margin, interpolated linearly over the horizon
    pub reserve_margin: LinearPath,
    /// Transmission and distribution losses as a proportion of demand, interpolated linearly over
    /// the horizon
    pub system_losses: LinearPath,
    /// The renewable share of generation in the base year
    pub renewable_base_share: Dimensionless,
    /// How far the achieved renewable share may deviate from the target trajectory each year
    #[serde(default = "default_renewable_tolerance")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub renewable_tolerance: Dimensionless,
    /// Cost applied to each unit of emissions
    #[serde(default)]
    pub carbon_price: MoneyPerEmissions,
    /// The unit system for all quantities in the model
    #[serde(default)]
    pub units: UnitSystem,
    /// Zones in which technologies can be deployed. If empty, zones are not checked.
    #[serde(default)]
    pub zones: Vec<ZoneID>,
    /// The maximum number of times the expansion problem is re-solved with updated learning-curve
    /// costs
    #[serde(default = "default_max_learning_iterations")]
    pub max_learning_iterations: u32,
    /// The relative change in installed capacity below which learning-curve costs are considered
    /// converged
    #[serde(default = "default_learning_tolerance")]
    pub learning_tolerance: Dimensionless,
    /// Wall-clock limit for solving a single scenario
    #[serde(default = "default_solver_timeout_seconds")]
    pub solver_timeout_seconds: f64,
}

/// Check that the `horizon_years` parameter is valid
fn check_horizon_years(value: u32) -> Result<()> {
    ensure!(value > 0, "horizon_years cannot be zero");

    Ok(())
}

/// Check that the `discount_rate` parameter is valid
fn check_discount_rate(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(-1.0),
        "discount_rate must be a finite number greater than -1"
    );

    if value > Dimensionless(1.0) {
        warn!("The discount rate is greater than 1. Check that it is not given as a percentage.");
    }

    Ok(())
}

/// Check that the `hours_per_year` parameter is valid
fn check_hours_per_year(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "hours_per_year must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that the `carbon_price` parameter is valid
fn check_carbon_price(value: MoneyPerEmissions) -> Result<()> {
    ensure!(
        value.is_finite() && value >= MoneyPerEmissions(0.0),
        "carbon_price must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that the `max_learning_iterations` parameter is valid
fn check_max_learning_iterations(value: u32) -> Result<()> {
    ensure!(value > 0, "max_learning_iterations cannot be zero");

    Ok(())
}

/// Check that the `learning_tolerance` parameter is valid
fn check_learning_tolerance(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(0.0),
        "learning_tolerance must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that the `solver_timeout_seconds` parameter is valid
fn check_solver_timeout_seconds(value: f64) -> Result<()> {
    ensure!(
        value > 0.0 && value <= MAX_SOLVER_TIMEOUT_SECONDS,
        "solver_timeout_seconds must be greater than zero and at most {MAX_SOLVER_TIMEOUT_SECONDS}"
    );

    Ok(())
}

/// Check that the `zones` parameter is valid
fn check_zones(zones: &[ZoneID]) -> Result<()> {
    ensure!(is_unique(zones), "zones must not contain duplicates");

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file.
    ///
    /// Physical parameters (load factor, reserve margin, losses, renewable base share) are checked
    /// when each scenario is constructed instead, so that they are reported per scenario.
    fn validate(&self) -> Result<()> {
        check_horizon_years(self.horizon_years)?;
        check_discount_rate(self.discount_rate)?;
        check_hours_per_year(self.hours_per_year)?;

        // renewable_tolerance already validated with deserialise_proportion

        check_carbon_price(self.carbon_price)?;
        check_zones(&self.zones)?;
        check_max_learning_iterations(self.max_learning_iterations)?;
        check_learning_tolerance(self.learning_tolerance)?;
        check_solver_timeout_seconds(self.solver_timeout_seconds)?;

        Ok(())
    }

    /// The years covered by the model
    pub fn horizon(&self) -> Horizon {
        Horizon::new(self.base_year, self.horizon_years)
    }

    /// The zones declared for the model
    pub fn zone_ids(&self) -> IndexSet<ZoneID> {
        self.zones.iter().cloned().collect()
    }

    /// The wall-clock limit for solving a single scenario.
    ///
    /// Values too large to represent as a [`Duration`] are treated as no limit.
    pub fn solver_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.solver_timeout_seconds).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::EnergyUnit;
    use rstest::rstest;
    use std::fmt::Display;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Helper function to assert validation result based on expected validity
    fn assert_validation_result<T, U: Display>(
        result: Result<T>,
        expected_valid: bool,
        value: U,
        expected_error_fragment: &str,
    ) {
        if expected_valid {
            assert!(
                result.is_ok(),
                "Expected value {} to be valid, but got error: {:?}",
                value,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Expected value {value} to be invalid, but it was accepted",
            );
            let error_message = result.err().unwrap().to_string();
            assert!(
                error_message.contains(expected_error_fragment),
                "Error message should mention the validation constraint, got: {error_message}",
            );
        }
    }

    const MINIMAL_MODEL_TOML: &str = "base_year = 2014
horizon_years = 36
load_factor = 0.65
reserve_margin = { initial = 0.2, final = 0.12 }
system_losses = { initial = 0.08, final = 0.04 }
renewable_base_share = 0.25";

    #[test]
    fn test_model_params_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(file, "{MINIMAL_MODEL_TOML}").unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(model_params.base_year, 2014);
        assert_eq!(model_params.horizon().final_year(), 2050);
        assert_eq!(model_params.reserve_margin.end, 0.12);

        // Defaults
        assert_eq!(model_params.discount_rate, Dimensionless(0.1));
        assert_eq!(model_params.hours_per_year, 8760.0);
        assert_eq!(model_params.renewable_tolerance, Dimensionless(0.01));
        assert_eq!(model_params.carbon_price, MoneyPerEmissions(0.0));
        assert_eq!(model_params.units.energy, EnergyUnit::GigawattHours);
        assert_eq!(model_params.max_learning_iterations, 20);
        assert_eq!(model_params.learning_tolerance, Dimensionless(1e-3));
        assert_eq!(model_params.solver_timeout(), Duration::from_secs(300));
        assert!(model_params.zone_ids().is_empty());
    }

    #[test]
    fn test_model_params_from_path_bad_tolerance() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(file, "{MINIMAL_MODEL_TOML}\nrenewable_tolerance = 1.5").unwrap();
        }

        assert!(ModelParameters::from_path(dir.path()).is_err());
    }

    #[rstest]
    #[case(1, true)]
    #[case(36, true)]
    #[case(0, false)]
    fn test_check_horizon_years(#[case] value: u32, #[case] expected_valid: bool) {
        assert_validation_result(
            check_horizon_years(value),
            expected_valid,
            value,
            "horizon_years cannot be zero",
        );
    }

    #[rstest]
    #[case(0.0, true)] // Valid: no discounting
    #[case(0.07, true)]
    #[case(0.1, true)] // Valid default value
    #[case(-1.0, false)] // Invalid: discount factor undefined
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_discount_rate(#[case] value: f64, #[case] expected_valid: bool) {
        assert_validation_result(
            check_discount_rate(Dimensionless(value)),
            expected_valid,
            value,
            "discount_rate must be a finite number greater than -1",
        );
    }

    #[rstest]
    #[case(8760.0, true)]
    #[case(8784.0, true)]
    #[case(0.0, false)]
    #[case(-8760.0, false)]
    #[case(f64::NAN, false)]
    fn test_check_hours_per_year(#[case] value: f64, #[case] expected_valid: bool) {
        assert_validation_result(
            check_hours_per_year(value),
            expected_valid,
            value,
            "hours_per_year must be a finite number greater than zero",
        );
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(30.0, true)]
    #[case(-1.0, false)]
    #[case(f64::INFINITY, false)]
    fn test_check_carbon_price(#[case] value: f64, #[case] expected_valid: bool) {
        assert_validation_result(
            check_carbon_price(MoneyPerEmissions(value)),
            expected_valid,
            value,
            "carbon_price must be a finite number greater than or equal to zero",
        );
    }

    #[rstest]
    #[case(1, true)] // Valid minimum value
    #[case(20, true)] // Valid default value
    #[case(u32::MAX, true)] // Valid maximum value
    #[case(0, false)] // Invalid: zero
    fn test_check_max_learning_iterations(#[case] value: u32, #[case] expected_valid: bool) {
        assert_validation_result(
            check_max_learning_iterations(value),
            expected_valid,
            value,
            "max_learning_iterations cannot be zero",
        );
    }

    #[rstest]
    #[case(1e-3, true)] // Valid default value
    #[case(1e-10, true)]
    #[case(0.0, false)] // Invalid: would never converge
    #[case(-1e-3, false)]
    #[case(f64::NAN, false)]
    fn test_check_learning_tolerance(#[case] value: f64, #[case] expected_valid: bool) {
        assert_validation_result(
            check_learning_tolerance(Dimensionless(value)),
            expected_valid,
            value,
            "learning_tolerance must be a finite number greater than zero",
        );
    }

    #[rstest]
    #[case(300.0, true)]
    #[case(0.5, true)]
    #[case(604_800.0, true)]
    #[case(0.0, false)]
    #[case(604_801.0, false)]
    #[case(1e20, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_solver_timeout_seconds(#[case] value: f64, #[case] expected_valid: bool) {
        assert_validation_result(
            check_solver_timeout_seconds(value),
            expected_valid,
            value,
            "solver_timeout_seconds must be greater than zero and at most 604800",
        );
    }

    #[rstest]
    #[case(0.5, Duration::from_millis(500))]
    #[case(1e20, Duration::MAX)]
    fn test_solver_timeout(#[case] seconds: f64, #[case] expected: Duration) {
        let mut model_params: ModelParameters = toml::from_str(MINIMAL_MODEL_TOML).unwrap();
        model_params.solver_timeout_seconds = seconds;
        assert_eq!(model_params.solver_timeout(), expected);
    }

    #[test]
    fn test_check_zones() {
        assert!(check_zones(&[]).is_ok());
        assert!(check_zones(&["north".into(), "south".into()]).is_ok());
        assert!(check_zones(&["north".into(), "north".into()]).is_err());
    }
}
