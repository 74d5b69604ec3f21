//! Code for reading the scenario matrix from `scenarios.csv`.
use super::{input_err_msg, read_csv_optional};
use crate::demand::DemandInputs;
use crate::scenario::{DemandPath, RenewableTarget, Scenario};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::Path;

const SCENARIOS_FILE_NAME: &str = "scenarios.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct ScenarioRaw {
    renewable_target: RenewableTarget,
    demand_path: DemandPath,
}

/// Read the scenario matrix from the specified model directory.
///
/// If the file is not present, the full matrix of every renewable target and demand path is used.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `demand` - Demand inputs, which must define every demand path used
///
/// # Returns
///
/// The scenarios to run, in order.
pub fn read_scenarios(model_dir: &Path, demand: &DemandInputs) -> Result<Vec<Scenario>> {
    let file_path = model_dir.join(SCENARIOS_FILE_NAME);
    let scenarios = match read_csv_optional::<ScenarioRaw>(&file_path)? {
        Some(rows) => read_scenarios_from_iter(rows.into_iter(), demand)
            .with_context(|| input_err_msg(&file_path))?,
        None => {
            let scenarios = Scenario::full_matrix();
            check_demand_paths_defined(&scenarios, demand).with_context(|| {
                format!("{} not provided, so every demand path is needed", file_path.display())
            })?;
            scenarios
        }
    };

    Ok(scenarios)
}

fn read_scenarios_from_iter<I>(iter: I, demand: &DemandInputs) -> Result<Vec<Scenario>>
where
    I: Iterator<Item = ScenarioRaw>,
{
    let mut scenarios = IndexSet::new();
    for raw in iter {
        let scenario = Scenario::new(raw.renewable_target, raw.demand_path);
        ensure!(
            scenarios.insert(scenario),
            "Scenario {scenario} listed more than once"
        );
    }
    ensure!(!scenarios.is_empty(), "Scenario matrix is empty");

    let scenarios = scenarios.into_iter().collect::<Vec<_>>();
    check_demand_paths_defined(&scenarios, demand)?;

    Ok(scenarios)
}

/// Check that every scenario's demand path has a demand model
fn check_demand_paths_defined(scenarios: &[Scenario], demand: &DemandInputs) -> Result<()> {
    for scenario in scenarios {
        ensure!(
            demand.paths.contains_key(&scenario.demand_path),
            "No demand model defined for demand path {} (needed by scenario {scenario})",
            scenario.demand_path
        );
    }

    Ok(())
}
