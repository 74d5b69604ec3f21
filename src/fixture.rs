//! Fixtures for tests

use crate::demand::{DemandInputs, DemandModel, EconomicDrivers};
use crate::model::{Model, ModelParameters};
use crate::pathway::{Pathway, PathwaySpec};
use crate::scenario::{DemandPath, Scenario};
use crate::technology::{Technology, TechnologyClass, TechnologyMap};
use crate::units::{
    Capacity, Dimensionless, EmissionsPerEnergy, Energy, EnergyUnit, MoneyPerCapacity,
    MoneyPerEmissions, MoneyPerEnergy, MoneyUnit, UnitSystem,
};
use crate::year::LinearPath;
use crate::zone::ZoneSelection;
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A technology without learning, emissions or fuel costs
fn technology(id: &str, class: TechnologyClass, capacity_factor: f64) -> Technology {
    Technology {
        id: id.into(),
        description: format!("{id} plant"),
        class,
        capacity_factor: Dimensionless(capacity_factor),
        emission_factor: EmissionsPerEnergy(0.0),
        unit_cost: MoneyPerCapacity(1.0),
        learning_rate: Dimensionless(0.0),
        learning_reference_capacity: Capacity(1.0),
        om_cost: MoneyPerCapacity(0.02),
        fuel_cost: MoneyPerEnergy(0.0),
        max_annual_build: Capacity(1.0),
        max_potential: Capacity(10.0),
        base_capacity: Capacity(1.0),
        zones: ZoneSelection::All,
    }
}

#[fixture]
pub fn hydro() -> Technology {
    Technology {
        unit_cost: MoneyPerCapacity(2.0),
        om_cost: MoneyPerCapacity(0.03),
        max_annual_build: Capacity(2.0),
        max_potential: Capacity(30.0),
        base_capacity: Capacity(10.0),
        learning_reference_capacity: Capacity(10.0),
        ..technology("hydro", TechnologyClass::Renewable, 0.45)
    }
}

#[fixture]
pub fn solar() -> Technology {
    Technology {
        unit_cost: MoneyPerCapacity(0.8),
        om_cost: MoneyPerCapacity(0.015),
        max_annual_build: Capacity(10.0),
        max_potential: Capacity(200.0),
        base_capacity: Capacity(1.0),
        ..technology("solar", TechnologyClass::Renewable, 0.2)
    }
}

#[fixture]
pub fn coal() -> Technology {
    Technology {
        emission_factor: EmissionsPerEnergy(0.95),
        unit_cost: MoneyPerCapacity(1.5),
        om_cost: MoneyPerCapacity(0.04),
        fuel_cost: MoneyPerEnergy(0.03),
        max_annual_build: Capacity(5.0),
        max_potential: Capacity(100.0),
        base_capacity: Capacity(20.0),
        learning_reference_capacity: Capacity(20.0),
        ..technology("coal", TechnologyClass::Thermal, 0.75)
    }
}

#[fixture]
pub fn technologies(hydro: Technology, solar: Technology, coal: Technology) -> TechnologyMap {
    [hydro, solar, coal]
        .into_iter()
        .map(|technology| (technology.id.clone(), technology))
        .collect()
}

#[fixture]
pub fn economic_drivers() -> EconomicDrivers {
    EconomicDrivers {
        gdp: 244.4,
        gdp_growth: 0.045,
        population: 195.0,
        population_growth: 0.018,
        intensity: LinearPath::new(0.35, 0.40),
        electrification: LinearPath::new(0.68, 0.95),
    }
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters {
        base_year: 2014,
        horizon_years: 10,
        discount_rate: Dimensionless(0.1),
        load_factor: Dimensionless(0.65),
        hours_per_year: 8760.0,
        reserve_margin: LinearPath::new(0.20, 0.12),
        system_losses: LinearPath::new(0.08, 0.04),
        renewable_base_share: Dimensionless(0.25),
        renewable_tolerance: Dimensionless(0.01),
        carbon_price: MoneyPerEmissions(0.0),
        units: UnitSystem {
            energy: EnergyUnit::TerawattHours,
            money: MoneyUnit::Billion,
        },
        zones: Vec::new(),
        max_learning_iterations: 20,
        learning_tolerance: Dimensionless(1e-3),
        solver_timeout_seconds: 300.0,
    }
}

#[fixture]
pub fn demand_inputs(economic_drivers: EconomicDrivers) -> DemandInputs {
    DemandInputs {
        base_demand: Energy(87.34),
        paths: indexmap! {
            DemandPath::Low => DemandModel::CompoundGrowth { growth_rate: 0.045 },
            DemandPath::BusinessAsUsual => DemandModel::CompoundGrowth { growth_rate: 0.056 },
            DemandPath::Medium => DemandModel::Economic(economic_drivers),
            DemandPath::High => DemandModel::CompoundGrowth { growth_rate: 0.065 },
        },
    }
}

/// A ten-year pathway reaching a 50% renewable share, with demand growing by 4% a year
#[fixture]
pub fn pathway(model_parameters: ModelParameters) -> Pathway {
    let spec = PathwaySpec {
        label: "REN50_test".into(),
        target_share: Dimensionless(0.5),
        demand_model: DemandModel::CompoundGrowth { growth_rate: 0.04 },
    };
    Pathway::build(&model_parameters, Energy(100.0), &spec).unwrap()
}

#[fixture]
pub fn model(
    model_parameters: ModelParameters,
    technologies: TechnologyMap,
    demand_inputs: DemandInputs,
) -> Model {
    Model {
        model_path: PathBuf::from("model"),
        parameters: model_parameters,
        technologies,
        demand: DemandInputs {
            base_demand: Energy(100.0),
            ..demand_inputs
        },
        scenarios: Scenario::full_matrix(),
    }
}
