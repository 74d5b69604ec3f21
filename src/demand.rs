//! Code for projecting electricity demand over the model horizon.
//!
//! Each demand path uses one of two interchangeable models: compound growth at a fixed rate, or an
//! economic model in which demand follows GDP, electricity intensity and electrification.
use crate::error::ensure_param;
use crate::scenario::DemandPath;
use crate::units::{Dimensionless, Energy};
use crate::year::{Horizon, LinearPath};
use anyhow::Result;
use indexmap::IndexMap;
use serde::Deserialize;

/// How demand evolves over the horizon
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DemandModel {
    /// Demand grows by a fixed proportion every year
    CompoundGrowth {
        /// Annual growth rate (e.g. 0.056 for 5.6%)
        growth_rate: f64,
    },
    /// Demand follows economic activity
    Economic(EconomicDrivers),
}

/// The drivers of demand in the economic model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomicDrivers {
    /// GDP in the base year
    pub gdp: f64,
    /// Annual GDP growth rate
    pub gdp_growth: f64,
    /// Population in the base year
    pub population: f64,
    /// Annual population growth rate
    pub population_growth: f64,
    /// Electricity intensity of GDP
    pub intensity: LinearPath,
    /// Share of final energy use supplied by electricity
    pub electrification: LinearPath,
}

/// Base-year demand and the demand model for each demand path
#[derive(Debug, Clone, PartialEq)]
pub struct DemandInputs {
    /// Historical demand in the base year, shared by all demand paths
    pub base_demand: Energy,
    /// Demand model for each demand path
    pub paths: IndexMap<DemandPath, DemandModel>,
}

/// Projected demand for every year of the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct DemandProjection {
    /// Demand in each year, starting with the base year
    pub demand: Vec<Energy>,
    /// Population in each year, if the demand model includes it
    pub population: Option<Vec<f64>>,
}

/// Check that a growth input is finite and positive
macro_rules! ensure_positive {
    ($name:expr, $value:expr) => {
        ensure_param!(
            $value.is_finite() && $value > 0.0,
            "{} must be a finite number greater than zero, got {}",
            $name,
            $value
        )
    };
}

/// Compound growth from `initial` after `years` years
fn compound(initial: f64, rate: f64, years: u32) -> f64 {
    initial * (1.0 + rate).powf(f64::from(years))
}

/// Project demand over the horizon.
///
/// The economic model is calibrated so that the base year reproduces `base_demand`:
///
/// ```text
/// D(t) = D0 * [GDP(t) * I(t) * E(t)] / [GDP(0) * I(0) * E(0)]
/// ```
///
/// # Arguments
///
/// * `model` - The demand model for this demand path
/// * `base_demand` - Historical demand in the base year
/// * `horizon` - The years to project over
///
/// # Returns
///
/// The projected demand, or a [`ParameterError`](crate::error::ParameterError) if any input is
/// out of range.
pub fn project_demand(
    model: &DemandModel,
    base_demand: Energy,
    horizon: &Horizon,
) -> Result<DemandProjection> {
    ensure_param!(
        horizon.length() > 0,
        "Horizon length must be greater than zero"
    );
    ensure_positive!("Base-year demand", base_demand.value());

    match model {
        DemandModel::CompoundGrowth { growth_rate } => {
            ensure_positive!("Demand growth rate", *growth_rate);

            let demand = horizon
                .iter_years()
                .map(|year| {
                    let elapsed = horizon.years_elapsed(year);
                    Energy(compound(base_demand.value(), *growth_rate, elapsed))
                })
                .collect();

            Ok(DemandProjection {
                demand,
                population: None,
            })
        }
        DemandModel::Economic(drivers) => project_economic_demand(drivers, base_demand, horizon),
    }
}

fn project_economic_demand(
    drivers: &EconomicDrivers,
    base_demand: Energy,
    horizon: &Horizon,
) -> Result<DemandProjection> {
    ensure_positive!("GDP", drivers.gdp);
    ensure_positive!("GDP growth rate", drivers.gdp_growth);
    ensure_positive!("Population", drivers.population);
    ensure_positive!("Population growth rate", drivers.population_growth);
    ensure_param!(
        drivers.intensity.all(|value| value > 0.0),
        "Electricity intensity must be greater than zero"
    );
    ensure_param!(
        drivers.electrification.all(|value| value > 0.0),
        "Electrification factor must be greater than zero"
    );

    let activity = |year: u32| {
        let elapsed = horizon.years_elapsed(year);
        let fraction = horizon.elapsed_fraction(year);
        compound(drivers.gdp, drivers.gdp_growth, elapsed)
            * drivers.intensity.value_at(fraction)
            * drivers.electrification.value_at(fraction)
    };
    let base_activity = activity(horizon.base_year());

    let demand = horizon
        .iter_years()
        .map(|year| base_demand * Dimensionless(activity(year) / base_activity))
        .collect();
    let population = horizon
        .iter_years()
        .map(|year| {
            compound(
                drivers.population,
                drivers.population_growth,
                horizon.years_elapsed(year),
            )
        })
        .collect();

    Ok(DemandProjection {
        demand,
        population: Some(population),
    })
}
