//! Learning-curve unit costs and the fixed-point iteration over them.
//!
//! Unit investment costs depend on cumulative deployment, which is itself an output of the
//! expansion problem. The costs are therefore held fixed for each solve and recalculated from the
//! previous solution's deployment until the installed capacities stop changing.
use super::CapacityRecord;
use crate::finance::learning_curve_unit_cost;
use crate::technology::{TechnologyID, TechnologyMap};
use crate::units::{Capacity, MoneyPerCapacity};
use crate::year::Horizon;
use indexmap::IndexMap;

/// Unit investment cost for each technology in each year
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCostMap(IndexMap<(TechnologyID, u32), MoneyPerCapacity>);

impl UnitCostMap {
    /// Unit costs before any deployment: the catalog cost in every year
    pub fn initial(technologies: &TechnologyMap, horizon: &Horizon) -> Self {
        let map = horizon
            .iter_years()
            .flat_map(|year| {
                technologies
                    .values()
                    .map(move |technology| ((technology.id.clone(), year), technology.unit_cost))
            })
            .collect();

        Self(map)
    }

    /// Unit costs given the deployment in a previous solution.
    ///
    /// Cumulative capacity in a year is the technology's reference capacity plus all the capacity
    /// added up to and including that year.
    ///
    /// # Arguments
    ///
    /// * `technologies` - The technology catalog
    /// * `records` - Capacity records in year order
    pub fn from_deployment(technologies: &TechnologyMap, records: &[CapacityRecord]) -> Self {
        let mut cumulative_additions: IndexMap<&TechnologyID, Capacity> = IndexMap::new();
        let mut map = IndexMap::new();
        for record in records {
            let technology = &technologies[&record.technology_id];
            let added = cumulative_additions
                .entry(&record.technology_id)
                .or_default();
            *added += record.addition;

            let reference = technology.learning_reference_capacity;
            let unit_cost = learning_curve_unit_cost(
                technology.unit_cost,
                technology.learning_rate,
                reference + *added,
                reference,
            );
            map.insert((record.technology_id.clone(), record.year), unit_cost);
        }

        Self(map)
    }

    /// Get the unit cost for a technology in a given year
    pub fn get(&self, technology_id: &TechnologyID, year: u32) -> MoneyPerCapacity {
        *self
            .0
            .get(&(technology_id.clone(), year))
            .expect("No unit cost for given technology and year")
    }
}

/// The largest change in installed capacity between two solutions, relative to the largest
/// installed capacity in the earlier one.
///
/// Both slices must describe the same technologies and years in the same order.
pub fn relative_capacity_change(previous: &[CapacityRecord], current: &[CapacityRecord]) -> f64 {
    assert_eq!(
        previous.len(),
        current.len(),
        "Capacity records cover different technologies or years"
    );

    let max_change = previous
        .iter()
        .zip(current)
        .map(|(before, after)| (after.installed - before.installed).value().abs())
        .fold(0.0, f64::max);
    let scale = previous
        .iter()
        .map(|record| record.installed.value())
        .fold(0.0, f64::max);

    if max_change == 0.0 {
        0.0
    } else {
        max_change / scale.max(f64::MIN_POSITIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{solar, technologies};
    use crate::technology::Technology;
    use crate::units::Dimensionless;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn record(technology_id: &str, year: u32, installed: f64, addition: f64) -> CapacityRecord {
        CapacityRecord {
            technology_id: technology_id.into(),
            year,
            installed: Capacity(installed),
            addition: Capacity(addition),
            retirement: Capacity(0.0),
            generation: crate::units::Energy(0.0),
            unit_cost: MoneyPerCapacity(0.0),
        }
    }

    #[rstest]
    fn test_initial_unit_costs(technologies: TechnologyMap) {
        let horizon = Horizon::new(2020, 5);
        let costs = UnitCostMap::initial(&technologies, &horizon);
        for technology in technologies.values() {
            for year in horizon.iter_years() {
                assert_eq!(costs.get(&technology.id, year), technology.unit_cost);
            }
        }
    }

    #[rstest]
    fn test_unit_costs_from_deployment(solar: Technology) {
        let solar = Technology {
            learning_rate: Dimensionless(0.25),
            learning_reference_capacity: Capacity(5.0),
            ..solar
        };
        let technologies: TechnologyMap = [(solar.id.clone(), solar.clone())].into_iter().collect();
        let records = [
            record("solar", 2020, 1.0, 0.0),
            record("solar", 2021, 6.0, 5.0),
            record("solar", 2022, 16.0, 10.0),
        ];

        let costs = UnitCostMap::from_deployment(&technologies, &records);
        let id = solar.id.clone();
        assert_eq!(costs.get(&id, 2020), solar.unit_cost);
        // Cumulative deployment doubles the reference
        assert_approx_eq!(
            MoneyPerCapacity,
            costs.get(&id, 2021),
            solar.unit_cost * Dimensionless(2.0_f64.powf(-0.25)),
            epsilon = 1e-12
        );
        assert_approx_eq!(
            MoneyPerCapacity,
            costs.get(&id, 2022),
            solar.unit_cost * Dimensionless(4.0_f64.powf(-0.25)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_relative_capacity_change() {
        let previous = [record("a", 2020, 10.0, 0.0), record("b", 2020, 20.0, 0.0)];
        let current = [record("a", 2020, 12.0, 0.0), record("b", 2020, 19.0, 0.0)];
        assert_approx_eq!(
            f64,
            relative_capacity_change(&previous, &current),
            0.1,
            epsilon = 1e-12
        );
        assert_eq!(relative_capacity_change(&previous, &previous), 0.0);
    }
}
