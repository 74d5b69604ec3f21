//! The reliability planner derives peak demand and the capacity needed to cover it.
use crate::error::ensure_param;
use crate::model::ModelParameters;
use crate::units::{Capacity, Dimensionless, Energy};
use crate::year::LinearPath;
use anyhow::Result;

/// Capacity and energy requirements for a single year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityRequirement {
    /// Average load divided by the load factor
    pub peak_demand: Capacity,
    /// Reserve margin above peak demand
    pub reserve_margin: Dimensionless,
    /// Installed capacity needed to cover peak demand plus the reserve margin
    pub required_capacity: Capacity,
    /// Transmission and distribution losses as a proportion of demand
    pub system_losses: Dimensionless,
    /// Generation needed to cover demand plus losses
    pub required_generation: Energy,
}

/// Derives capacity requirements from demand
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityPlanner {
    load_factor: Dimensionless,
    hours_per_year: f64,
    reserve_margin: LinearPath,
    system_losses: LinearPath,
}

impl ReliabilityPlanner {
    /// Create a new [`ReliabilityPlanner`], checking that the parameters are in range.
    ///
    /// Reserve margin and system losses may rise or fall over the horizon.
    pub fn new(
        load_factor: Dimensionless,
        hours_per_year: f64,
        reserve_margin: LinearPath,
        system_losses: LinearPath,
    ) -> Result<Self> {
        ensure_param!(
            load_factor.is_finite()
                && load_factor > Dimensionless(0.0)
                && load_factor <= Dimensionless(1.0),
            "Load factor must be greater than zero and at most one, got {load_factor}"
        );
        ensure_param!(
            hours_per_year.is_finite() && hours_per_year > 0.0,
            "Hours per year must be greater than zero, got {hours_per_year}"
        );
        ensure_param!(
            reserve_margin.all(|value| value >= 0.0),
            "Reserve margin cannot be negative"
        );
        ensure_param!(
            system_losses.all(|value| (0.0..1.0).contains(&value)),
            "System losses must be at least zero and less than one"
        );

        Ok(Self {
            load_factor,
            hours_per_year,
            reserve_margin,
            system_losses,
        })
    }

    /// Create a [`ReliabilityPlanner`] from the model parameters
    pub fn from_parameters(parameters: &ModelParameters) -> Result<Self> {
        Self::new(
            parameters.load_factor,
            parameters.hours_per_year,
            parameters.reserve_margin,
            parameters.system_losses,
        )
    }

    /// Peak demand for the given annual demand
    pub fn peak_demand(&self, demand: Energy) -> Capacity {
        demand.average_capacity(self.hours_per_year) / self.load_factor
    }

    /// The requirements for a year with the given demand.
    ///
    /// # Arguments
    ///
    /// * `demand` - Annual demand
    /// * `elapsed_fraction` - How far through the horizon the year is (0 for the base year, 1 for
    ///   the final year)
    pub fn requirement(&self, demand: Energy, elapsed_fraction: f64) -> CapacityRequirement {
        let peak_demand = self.peak_demand(demand);
        let reserve_margin = Dimensionless(self.reserve_margin.value_at(elapsed_fraction));
        let system_losses = Dimensionless(self.system_losses.value_at(elapsed_fraction));

        CapacityRequirement {
            peak_demand,
            reserve_margin,
            required_capacity: peak_demand * (Dimensionless(1.0) + reserve_margin),
            system_losses,
            required_generation: demand * (Dimensionless(1.0) + system_losses),
        }
    }
}
