//! Code for reading the technology catalog from `technologies.csv`.
use super::{input_err_msg, read_csv};
use crate::id::HasID;
use crate::technology::{Technology, TechnologyClass, TechnologyID, TechnologyMap};
use crate::units::{
    Capacity, Dimensionless, EmissionsPerEnergy, MoneyPerCapacity, MoneyPerEnergy,
};
use crate::zone::{ZoneID, parse_zone_str};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use log::warn;
use serde::Deserialize;
use std::path::Path;

const TECHNOLOGIES_FILE_NAME: &str = "technologies.csv";

/// A row of the technologies CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct TechnologyRaw {
    id: String,
    description: String,
    class: TechnologyClass,
    capacity_factor: Dimensionless,
    emission_factor: EmissionsPerEnergy,
    unit_cost: MoneyPerCapacity,
    learning_rate: Dimensionless,
    learning_reference_capacity: Option<Capacity>,
    om_cost: MoneyPerCapacity,
    fuel_cost: MoneyPerEnergy,
    max_annual_build: Capacity,
    max_potential: Capacity,
    base_capacity: Capacity,
    #[serde(default)]
    zones: String,
}

/// Check that a value is finite and non-negative
fn check_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "Invalid value for {name} ({value}). Must be >=0."
    );

    Ok(())
}

impl TechnologyRaw {
    fn validate(&self) -> Result<()> {
        ensure!(!self.id.trim().is_empty(), "Technology ID cannot be empty");

        ensure!(
            self.capacity_factor > Dimensionless(0.0) && self.capacity_factor <= Dimensionless(1.0),
            "Invalid value for capacity_factor ({}). Must be >0 and <=1.",
            self.capacity_factor
        );
        ensure!(
            self.learning_rate >= Dimensionless(0.0) && self.learning_rate < Dimensionless(1.0),
            "Invalid value for learning_rate ({}). Must be >=0 and <1.",
            self.learning_rate
        );

        check_non_negative("emission_factor", self.emission_factor.value())?;
        check_non_negative("unit_cost", self.unit_cost.value())?;
        check_non_negative("om_cost", self.om_cost.value())?;
        check_non_negative("fuel_cost", self.fuel_cost.value())?;
        check_non_negative("max_annual_build", self.max_annual_build.value())?;
        check_non_negative("base_capacity", self.base_capacity.value())?;
        check_non_negative("max_potential", self.max_potential.value())?;
        if let Some(reference) = self.learning_reference_capacity {
            check_non_negative("learning_reference_capacity", reference.value())?;
        }

        ensure!(
            self.max_potential >= self.base_capacity,
            "max_potential ({}) is less than base_capacity ({})",
            self.max_potential,
            self.base_capacity
        );

        if self.class == TechnologyClass::Renewable && self.emission_factor > EmissionsPerEnergy(0.0)
        {
            warn!(
                "Renewable technology {} has a non-zero emission factor ({})",
                self.id, self.emission_factor
            );
        }

        Ok(())
    }

    /// The cumulative deployment at which the initial unit cost applies.
    ///
    /// Defaults to the base-year capacity.
    fn learning_reference_capacity(&self) -> Result<Capacity> {
        let reference = self
            .learning_reference_capacity
            .unwrap_or(self.base_capacity);
        ensure!(
            self.learning_rate == Dimensionless(0.0) || reference > Capacity(0.0),
            "A learning_reference_capacity greater than zero is required when learning_rate is \
            non-zero (base_capacity is zero)"
        );

        Ok(reference)
    }

    fn into_technology(self, zone_ids: &IndexSet<ZoneID>) -> Result<Technology> {
        self.validate()?;
        let learning_reference_capacity = self.learning_reference_capacity()?;
        let zones = parse_zone_str(&self.zones, zone_ids)?;

        Ok(Technology {
            id: TechnologyID::from(self.id.trim()),
            description: self.description,
            class: self.class,
            capacity_factor: self.capacity_factor,
            emission_factor: self.emission_factor,
            unit_cost: self.unit_cost,
            learning_rate: self.learning_rate,
            learning_reference_capacity,
            om_cost: self.om_cost,
            fuel_cost: self.fuel_cost,
            max_annual_build: self.max_annual_build,
            max_potential: self.max_potential,
            base_capacity: self.base_capacity,
            zones,
        })
    }
}

/// Read the technology catalog from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `zone_ids` - All possible zone IDs (empty if zones are not checked)
///
/// # Returns
///
/// A map of [`Technology`]s, keyed by technology ID, in file order.
pub fn read_technologies(model_dir: &Path, zone_ids: &IndexSet<ZoneID>) -> Result<TechnologyMap> {
    let file_path = model_dir.join(TECHNOLOGIES_FILE_NAME);
    let technologies_csv = read_csv(&file_path)?;
    read_technologies_from_iter(technologies_csv, zone_ids)
        .with_context(|| input_err_msg(&file_path))
}

fn read_technologies_from_iter<I>(iter: I, zone_ids: &IndexSet<ZoneID>) -> Result<TechnologyMap>
where
    I: Iterator<Item = TechnologyRaw>,
{
    let mut technologies = TechnologyMap::new();
    for raw in iter {
        let id = raw.id.clone();
        let technology = raw
            .into_technology(zone_ids)
            .with_context(|| format!("Invalid parameters for technology {id}"))?;
        let id = technology.get_id().clone();
        ensure!(
            technologies.insert(id.clone(), technology).is_none(),
            "Duplicate technology ID found: {id}"
        );
    }

    if !technologies.values().any(Technology::is_renewable) {
        warn!("No renewable technologies defined; only a renewable target of zero can be met");
    }

    Ok(technologies)
}
