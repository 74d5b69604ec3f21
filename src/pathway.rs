//! A pathway is the sequence of yearly requirements that one capacity expansion problem is
//! formulated over.
//!
//! [`PathwaySpec`] is the entry point for drivers which vary inputs outside the scenario matrix
//! (e.g. sensitivity studies): it takes a target share and a demand model directly.
use crate::demand::{DemandModel, project_demand};
use crate::model::{Model, ModelParameters};
use crate::reliability::ReliabilityPlanner;
use crate::renewable::RenewableTrajectory;
use crate::scenario::Scenario;
use crate::units::{Capacity, Dimensionless, Energy};
use crate::year::Horizon;
use anyhow::{Context, Result};

/// Requirements for a single year of a pathway
#[derive(Debug, Clone, PartialEq)]
pub struct YearState {
    /// Calendar year
    pub year: u32,
    /// Annual demand
    pub demand: Energy,
    /// Population, if the demand model includes it
    pub population: Option<f64>,
    /// Peak demand
    pub peak_demand: Capacity,
    /// Planning reserve margin
    pub reserve_margin: Dimensionless,
    /// Installed capacity needed for reliability
    pub required_capacity: Capacity,
    /// Transmission and distribution losses as a proportion of demand
    pub system_losses: Dimensionless,
    /// Generation needed to cover demand plus losses
    pub required_generation: Energy,
    /// Target renewable share of generation
    pub target_share: Dimensionless,
}

/// The inputs which distinguish one pathway from another
#[derive(Debug, Clone, PartialEq)]
pub struct PathwaySpec {
    /// Name used in log messages and diagnostics
    pub label: String,
    /// The renewable share to be reached in the final year
    pub target_share: Dimensionless,
    /// How demand evolves
    pub demand_model: DemandModel,
}

impl PathwaySpec {
    /// The spec for a scenario in the model's matrix
    pub fn for_scenario(model: &Model, scenario: &Scenario) -> Result<Self> {
        Ok(Self {
            label: scenario.to_string(),
            target_share: scenario.renewable_target.share(),
            demand_model: model.demand_model(scenario)?.clone(),
        })
    }
}

/// The yearly requirements for one expansion problem
#[derive(Debug, Clone, PartialEq)]
pub struct Pathway {
    /// Name used in log messages and diagnostics
    pub label: String,
    /// The renewable share to be reached in the final year
    pub target_share: Dimensionless,
    /// The years covered
    pub horizon: Horizon,
    /// One entry per year, starting with the base year
    pub years: Vec<YearState>,
}

impl Pathway {
    /// Derive the yearly requirements for a pathway.
    ///
    /// # Arguments
    ///
    /// * `parameters` - Model parameters
    /// * `base_demand` - Historical demand in the base year
    /// * `spec` - The target share and demand model
    ///
    /// # Returns
    ///
    /// The pathway, or a [`ParameterError`](crate::error::ParameterError) if any input is out of
    /// range.
    pub fn build(
        parameters: &ModelParameters,
        base_demand: Energy,
        spec: &PathwaySpec,
    ) -> Result<Self> {
        let horizon = parameters.horizon();
        let projection = project_demand(&spec.demand_model, base_demand, &horizon)
            .context("Invalid demand inputs")?;
        let planner =
            ReliabilityPlanner::from_parameters(parameters).context("Invalid reliability inputs")?;
        let trajectory = RenewableTrajectory::new(
            parameters.renewable_base_share,
            spec.target_share,
            &horizon,
        )
        .context("Invalid renewable target")?;

        let years = horizon
            .iter_years()
            .zip(projection.demand)
            .enumerate()
            .map(|(idx, (year, demand))| {
                let requirement = planner.requirement(demand, horizon.elapsed_fraction(year));
                YearState {
                    year,
                    demand,
                    population: projection.population.as_ref().map(|pop| pop[idx]),
                    peak_demand: requirement.peak_demand,
                    reserve_margin: requirement.reserve_margin,
                    required_capacity: requirement.required_capacity,
                    system_losses: requirement.system_losses,
                    required_generation: requirement.required_generation,
                    target_share: trajectory.share_at(year),
                }
            })
            .collect();

        Ok(Self {
            label: spec.label.clone(),
            target_share: trajectory.target_share(),
            horizon,
            years,
        })
    }

    /// The pathway for a scenario in the model's matrix
    pub fn for_scenario(model: &Model, scenario: &Scenario) -> Result<Self> {
        let spec = PathwaySpec::for_scenario(model, scenario)?;
        Self::build(&model.parameters, model.demand.base_demand, &spec)
    }

    /// Iterate over the years, with their index
    pub fn iter_years(&self) -> impl Iterator<Item = (usize, &YearState)> {
        self.years.iter().enumerate()
    }

    /// The final year's state
    pub fn final_year(&self) -> Option<&YearState> {
        self.years.last()
    }
}
