//! The model contains all the input data needed to run the scenarios.
use crate::demand::{DemandInputs, DemandModel};
use crate::scenario::Scenario;
use crate::technology::TechnologyMap;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// The technology catalog
    pub technologies: TechnologyMap,
    /// Base-year demand and demand paths
    pub demand: DemandInputs,
    /// The scenarios to run, in order
    pub scenarios: Vec<Scenario>,
}

impl Model {
    /// The demand model used by the given scenario
    pub fn demand_model(&self, scenario: &Scenario) -> Result<&DemandModel> {
        self.demand
            .paths
            .get(&scenario.demand_path)
            .with_context(|| format!("No demand model for demand path {}", scenario.demand_path))
    }
}
