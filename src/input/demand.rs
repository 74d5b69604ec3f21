//! Code for reading `demand.toml`, which defines base-year demand and the demand paths.
use super::{input_err_msg, read_toml};
use crate::demand::{DemandInputs, DemandModel};
use crate::scenario::DemandPath;
use crate::units::{Energy, EnergyUnit};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

const DEMAND_FILE_NAME: &str = "demand.toml";

/// The contents of the demand file
#[derive(Debug, Deserialize)]
struct DemandFile {
    /// Energy unit the file was written in, if declared
    energy_unit: Option<EnergyUnit>,
    base_demand: Energy,
    paths: IndexMap<String, DemandModel>,
}

impl DemandFile {
    fn into_demand_inputs(self, model_energy_unit: EnergyUnit) -> Result<DemandInputs> {
        if let Some(energy_unit) = self.energy_unit {
            ensure!(
                energy_unit == model_energy_unit,
                "Demand is given in {} but the model uses {}",
                energy_unit.energy_label(),
                model_energy_unit.energy_label()
            );
        }
        ensure!(!self.paths.is_empty(), "No demand paths defined");

        let mut paths = IndexMap::new();
        for (label, model) in self.paths {
            let path = DemandPath::from_str(&label)
                .ok()
                .with_context(|| format!("Unknown demand path {label}"))?;
            ensure!(
                paths.insert(path, model).is_none(),
                "Demand path {label} defined more than once"
            );
        }

        Ok(DemandInputs {
            base_demand: self.base_demand,
            paths,
        })
    }
}

/// Read demand inputs from the specified model directory.
///
/// The values of the growth parameters are checked later, when each scenario is constructed, so
/// that a bad demand path only affects the scenarios which use it.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `model_energy_unit` - The energy unit declared in `model.toml`
pub fn read_demand(model_dir: &Path, model_energy_unit: EnergyUnit) -> Result<DemandInputs> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let demand_file: DemandFile = read_toml(&file_path)?;
    demand_file
        .into_demand_inputs(model_energy_unit)
        .with_context(|| input_err_msg(&file_path))
}
