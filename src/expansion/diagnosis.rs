//! Explanations for infeasible expansion problems.
//!
//! The solver only reports that no feasible solution exists. To say why, each year's requirements
//! are compared against the most that the fleet could possibly deliver given the build-rate and
//! potential limits, and the first requirement which cannot be met is reported.
use crate::model::ModelParameters;
use crate::pathway::{Pathway, YearState};
use crate::technology::{Technology, TechnologyMap};
use crate::units::{Capacity, Dimensionless, Energy};
use itertools::Itertools;
use std::fmt;

/// What stops a technology from having more capacity in a given year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapacityLimit {
    /// The base-year fleet cannot be changed
    BaseYear,
    /// Capacity can only be added so fast
    BuildRate,
    /// The technology's resource is exhausted
    Potential,
}

impl fmt::Display for CapacityLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BaseYear => "base-year fleet",
            Self::BuildRate => "build rate",
            Self::Potential => "potential",
        };
        write!(f, "{label}")
    }
}

/// The most capacity a technology can have in the year `years_elapsed` years after the base year
fn max_capacity(technology: &Technology, years_elapsed: usize) -> (Capacity, CapacityLimit) {
    if years_elapsed == 0 {
        return (technology.base_capacity, CapacityLimit::BaseYear);
    }

    #[allow(clippy::cast_precision_loss)]
    let built = technology.max_annual_build * Dimensionless(years_elapsed as f64);
    let reachable = technology.base_capacity + built;
    if reachable < technology.max_potential {
        (reachable, CapacityLimit::BuildRate)
    } else {
        (technology.max_potential, CapacityLimit::Potential)
    }
}

/// Upper bounds on what the fleet can deliver in one year
struct FleetLimits<'a> {
    renewable_energy: Energy,
    non_renewable_energy: Energy,
    capacity: Capacity,
    renewable_limits: Vec<(&'a Technology, CapacityLimit)>,
}

impl<'a> FleetLimits<'a> {
    fn new(technologies: &'a TechnologyMap, years_elapsed: usize, hours_per_year: f64) -> Self {
        let mut limits = FleetLimits {
            renewable_energy: Energy(0.0),
            non_renewable_energy: Energy(0.0),
            capacity: Capacity(0.0),
            renewable_limits: Vec::new(),
        };

        for technology in technologies.values() {
            let (capacity, limit) = max_capacity(technology, years_elapsed);
            let energy = technology.max_generation(capacity, hours_per_year);
            limits.capacity += capacity;
            if technology.is_renewable() {
                limits.renewable_energy += energy;
                limits.renewable_limits.push((technology, limit));
            } else {
                limits.non_renewable_energy += energy;
            }
        }

        limits
    }
}

/// Formats an energy value with its unit
struct EnergyDisplay<'a> {
    energy: Energy,
    unit: &'a str,
}

impl fmt::Display for EnergyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.energy.value(), self.unit)
    }
}

/// Explain why an expansion problem has no feasible solution.
///
/// The checks run year by year from the base year, so the earliest violation is reported. If no
/// single requirement is out of reach, the requirements can only be violated in combination and a
/// generic explanation is given.
pub fn explain_infeasibility(
    parameters: &ModelParameters,
    technologies: &TechnologyMap,
    pathway: &Pathway,
) -> String {
    let target_pct = pathway.target_share.value() * 100.0;
    for (years_elapsed, year) in pathway.iter_years() {
        let limits = FleetLimits::new(technologies, years_elapsed, parameters.hours_per_year);
        if let Some(reason) = check_year(parameters, year, &limits) {
            return format!(
                "renewable target {target_pct:.0}% infeasible in {}: {reason}",
                year.year
            );
        }
    }

    format!(
        "renewable target {target_pct:.0}% infeasible: the renewable share, build-rate, potential \
        and reliability constraints cannot all be met together"
    )
}

/// Check one year's requirements against the fleet limits
fn check_year(parameters: &ModelParameters, year: &YearState, limits: &FleetLimits) -> Option<String> {
    let unit = parameters.units.energy;
    let energy = |energy| EnergyDisplay {
        energy,
        unit: unit.energy_label(),
    };
    let tolerance = parameters.renewable_tolerance;
    let lower = (year.target_share - tolerance).max(Dimensionless(0.0));
    let upper = (year.target_share + tolerance).min(Dimensionless(1.0));

    let min_renewable = year.required_generation * lower;
    if limits.renewable_energy < min_renewable {
        let binding = limits
            .renewable_limits
            .iter()
            .map(|(technology, limit)| format!("{}: {limit}", technology.id))
            .join("; ");
        return Some(format!(
            "renewable generation is capped at {} ({binding}) but at least {} is required",
            energy(limits.renewable_energy),
            energy(min_renewable)
        ));
    }

    let min_non_renewable = year.required_generation * (Dimensionless(1.0) - upper);
    if limits.non_renewable_energy < min_non_renewable {
        return Some(format!(
            "non-renewable generation is capped at {} but at least {} is required to keep the \
            renewable share below {:.0}%",
            energy(limits.non_renewable_energy),
            energy(min_non_renewable),
            upper.value() * 100.0
        ));
    }

    let total_energy = limits.renewable_energy + limits.non_renewable_energy;
    if total_energy < year.required_generation {
        return Some(format!(
            "generation is capped at {} but {} is required",
            energy(total_energy),
            energy(year.required_generation)
        ));
    }

    if limits.capacity < year.required_capacity {
        return Some(format!(
            "installed capacity is capped at {:.2} {} but {:.2} {} is required for reliability",
            limits.capacity.value(),
            unit.capacity_label(),
            year.required_capacity.value(),
            unit.capacity_label()
        ));
    }

    None
}
