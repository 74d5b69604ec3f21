//! Technologies are the kinds of generating plant which can be built and operated.
use crate::id::{define_id_getter, define_id_type};
use crate::units::{
    Capacity, Dimensionless, Emissions, EmissionsPerEnergy, Energy, MoneyPerCapacity,
    MoneyPerEmissions, MoneyPerEnergy,
};
use crate::zone::ZoneSelection;
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

define_id_type! {TechnologyID}

/// A map of [`Technology`]s, keyed by technology ID.
///
/// This is the technology catalog. It is loaded once and only ever read afterwards.
pub type TechnologyMap = IndexMap<TechnologyID, Technology>;

/// The role a technology plays in the system
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, DeserializeLabeledStringEnum, SerializeLabeledStringEnum,
)]
pub enum TechnologyClass {
    /// Counts towards the renewable share
    #[string = "renewable"]
    Renewable,
    /// Dispatchable fossil-fuelled plant
    #[string = "thermal"]
    Thermal,
    /// Non-renewable plant which normally runs continuously (e.g. nuclear)
    #[string = "baseload"]
    Baseload,
}

/// A generating technology
#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    /// A unique identifier for the technology (e.g. "SOLARE")
    pub id: TechnologyID,
    /// A human-readable description
    pub description: String,
    /// The technology's class
    pub class: TechnologyClass,
    /// Average output as a proportion of installed capacity
    pub capacity_factor: Dimensionless,
    /// Emissions per unit of generation
    pub emission_factor: EmissionsPerEnergy,
    /// Investment cost per unit of capacity at the learning reference capacity
    pub unit_cost: MoneyPerCapacity,
    /// Learning-curve exponent. Zero means the unit cost never changes.
    pub learning_rate: Dimensionless,
    /// Cumulative deployment at which `unit_cost` applies
    pub learning_reference_capacity: Capacity,
    /// Annual operation and maintenance cost per unit of installed capacity
    pub om_cost: MoneyPerCapacity,
    /// Fuel cost per unit of generation
    pub fuel_cost: MoneyPerEnergy,
    /// The most capacity which can be added in one year
    pub max_annual_build: Capacity,
    /// The most capacity which can be installed at any one time
    pub max_potential: Capacity,
    /// Installed capacity in the base year
    pub base_capacity: Capacity,
    /// The zones in which the technology can be deployed
    pub zones: ZoneSelection,
}
define_id_getter! {Technology, TechnologyID}

impl Technology {
    /// Whether generation from this technology counts towards the renewable share
    pub fn is_renewable(&self) -> bool {
        self.class == TechnologyClass::Renewable
    }

    /// Whether the unit cost falls with cumulative deployment
    pub fn has_learning(&self) -> bool {
        self.learning_rate > Dimensionless(0.0)
    }

    /// The most energy a unit of capacity can generate in a year
    pub fn annual_energy_per_capacity(&self, hours_per_year: f64) -> f64 {
        self.capacity_factor.value() * Capacity(1.0).energy_over(hours_per_year).value()
    }

    /// The most energy the given capacity can generate in a year
    pub fn max_generation(&self, capacity: Capacity, hours_per_year: f64) -> Energy {
        self.capacity_factor * capacity.energy_over(hours_per_year)
    }

    /// The variable cost of generation, including the cost of emissions
    pub fn generation_cost(&self, carbon_price: MoneyPerEmissions) -> MoneyPerEnergy {
        self.fuel_cost + carbon_price * self.emission_factor
    }

    /// Emissions from the given generation
    pub fn emissions(&self, generation: Energy) -> Emissions {
        self.emission_factor * generation
    }
}
