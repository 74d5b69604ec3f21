//! Code for deriving costs and emissions from an expansion solution.
use crate::expansion::{CapacityRecord, ExpansionSolution, IterationRecord};
use crate::pathway::Pathway;
use crate::technology::TechnologyMap;
use crate::units::{Capacity, Dimensionless, Emissions, Energy, Money, MoneyPerEnergy};

/// Totals for one year of a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct YearRecord {
    /// Calendar year
    pub year: u32,
    /// Annual demand
    pub demand: Energy,
    /// Demand divided by population, if the demand model includes population
    pub demand_per_capita: Option<f64>,
    /// Peak demand
    pub peak_demand: Capacity,
    /// Planning reserve margin
    pub reserve_margin: Dimensionless,
    /// Installed capacity needed for reliability
    pub required_capacity: Capacity,
    /// Transmission and distribution losses as a proportion of demand
    pub system_losses: Dimensionless,
    /// Total installed capacity
    pub installed_capacity: Capacity,
    /// Total generation
    pub generation: Energy,
    /// Generation from renewable technologies
    pub renewable_generation: Energy,
    /// Target renewable share of generation
    pub target_share: Dimensionless,
    /// Renewable share actually achieved
    pub achieved_share: Dimensionless,
    /// Investment in new capacity
    pub investment: Money,
    /// Operation and maintenance cost
    pub om_cost: Money,
    /// Fuel cost
    pub fuel_cost: Money,
    /// Emissions from generation
    pub emissions: Emissions,
    /// Investment from the base year up to and including this year
    pub cumulative_investment: Money,
    /// Emissions from the base year up to and including this year
    pub cumulative_emissions: Emissions,
}

/// Everything known about a successfully solved scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    /// Scenario name
    pub label: String,
    /// The renewable share targeted in the final year
    pub target_share: Dimensionless,
    /// Totals for each year
    pub years: Vec<YearRecord>,
    /// The solver's capacity records, in year order and then catalog order
    pub capacity: Vec<CapacityRecord>,
    /// Total discounted cost
    pub objective: f64,
    /// Undiscounted shadow price of energy in each year
    pub energy_prices: Vec<(u32, MoneyPerEnergy)>,
    /// Progress of each pass of the learning-curve iteration
    pub iterations: Vec<IterationRecord>,
    /// Whether learning-curve costs converged
    pub converged: bool,
}

impl ScenarioResult {
    /// Totals for the final year
    pub fn final_year(&self) -> Option<&YearRecord> {
        self.years.last()
    }

    /// Renewable share achieved in the final year
    pub fn final_share(&self) -> Dimensionless {
        self.final_year()
            .map_or(Dimensionless(0.0), |year| year.achieved_share)
    }

    /// Investment over the whole horizon
    pub fn cumulative_investment(&self) -> Money {
        self.final_year()
            .map_or(Money(0.0), |year| year.cumulative_investment)
    }

    /// Operation and maintenance cost over the whole horizon
    pub fn cumulative_om_cost(&self) -> Money {
        self.years.iter().map(|year| year.om_cost).sum()
    }

    /// Fuel cost over the whole horizon
    pub fn cumulative_fuel_cost(&self) -> Money {
        self.years.iter().map(|year| year.fuel_cost).sum()
    }

    /// Emissions over the whole horizon
    pub fn cumulative_emissions(&self) -> Emissions {
        self.final_year()
            .map_or(Emissions(0.0), |year| year.cumulative_emissions)
    }

    /// The number of times the expansion problem was solved
    pub fn num_iterations(&self) -> usize {
        self.iterations.len()
    }
}

/// Derive costs, emissions and renewable shares from an expansion solution.
///
/// Cumulative values are running sums from the base year, so the final cumulative value is
/// exactly the in-order sum of the annual values.
///
/// # Arguments
///
/// * `technologies` - The technology catalog used for the solve
/// * `pathway` - The pathway which was solved
/// * `solution` - The optimal solution
pub fn account(
    technologies: &TechnologyMap,
    pathway: &Pathway,
    solution: ExpansionSolution,
) -> ScenarioResult {
    let mut cumulative_investment = Money(0.0);
    let mut cumulative_emissions = Emissions(0.0);
    let mut years = Vec::with_capacity(pathway.years.len());

    for state in &pathway.years {
        let mut installed_capacity = Capacity(0.0);
        let mut generation = Energy(0.0);
        let mut renewable_generation = Energy(0.0);
        let mut investment = Money(0.0);
        let mut om_cost = Money(0.0);
        let mut fuel_cost = Money(0.0);
        let mut emissions = Emissions(0.0);

        for record in solution
            .capacity
            .iter()
            .filter(|record| record.year == state.year)
        {
            let technology = &technologies[&record.technology_id];
            installed_capacity += record.installed;
            generation += record.generation;
            if technology.is_renewable() {
                renewable_generation += record.generation;
            }
            investment += record.unit_cost * record.addition;
            om_cost += technology.om_cost * record.installed;
            fuel_cost += technology.fuel_cost * record.generation;
            emissions += technology.emissions(record.generation);
        }

        cumulative_investment = cumulative_investment + investment;
        cumulative_emissions = cumulative_emissions + emissions;
        let achieved_share = if generation > Energy(0.0) {
            renewable_generation / generation
        } else {
            Dimensionless(0.0)
        };

        years.push(YearRecord {
            year: state.year,
            demand: state.demand,
            demand_per_capita: state
                .population
                .map(|population| state.demand.value() / population),
            peak_demand: state.peak_demand,
            reserve_margin: state.reserve_margin,
            required_capacity: state.required_capacity,
            system_losses: state.system_losses,
            installed_capacity,
            generation,
            renewable_generation,
            target_share: state.target_share,
            achieved_share,
            investment,
            om_cost,
            fuel_cost,
            emissions,
            cumulative_investment,
            cumulative_emissions,
        });
    }

    ScenarioResult {
        label: pathway.label.clone(),
        target_share: pathway.target_share,
        years,
        capacity: solution.capacity,
        objective: solution.objective,
        energy_prices: solution.energy_prices,
        iterations: solution.iterations,
        converged: solution.converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::SolverDiagnostics;
    use crate::fixture::{pathway, technologies};
    use crate::units::MoneyPerCapacity;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    /// A made-up solution in which hydro grows by 1 unit a year and coal generates 50 units
    #[fixture]
    fn solution(technologies: TechnologyMap, pathway: Pathway) -> ExpansionSolution {
        let mut capacity = Vec::new();
        for (idx, state) in pathway.iter_years() {
            for technology in technologies.values() {
                let is_hydro = technology.id == "hydro".into();
                let addition = if is_hydro && idx > 0 { 1.0 } else { 0.0 };
                #[allow(clippy::cast_precision_loss)]
                let built = if is_hydro { idx as f64 } else { 0.0 };
                let generation = match technology.id.0.as_ref() {
                    "hydro" => 30.0,
                    "coal" => 50.0,
                    _ => 0.0,
                };
                capacity.push(CapacityRecord {
                    technology_id: technology.id.clone(),
                    year: state.year,
                    installed: technology.base_capacity + Capacity(built),
                    addition: Capacity(addition),
                    retirement: Capacity(0.0),
                    generation: Energy(generation),
                    unit_cost: MoneyPerCapacity(2.0),
                });
            }
        }

        ExpansionSolution {
            capacity,
            objective: 123.0,
            energy_prices: Vec::new(),
            iterations: Vec::new(),
            converged: true,
            diagnostics: SolverDiagnostics {
                num_constraints: 0,
                num_variables: 0,
                iteration: 1,
            },
        }
    }

    #[rstest]
    fn test_account(technologies: TechnologyMap, pathway: Pathway, solution: ExpansionSolution) {
        let result = account(&technologies, &pathway, solution);
        assert_eq!(result.years.len(), pathway.years.len());
        assert_eq!(result.objective, 123.0);

        let first = &result.years[0];
        assert_eq!(first.investment, Money(0.0));
        assert_eq!(first.generation, Energy(80.0));
        assert_eq!(first.renewable_generation, Energy(30.0));
        assert_approx_eq!(f64, first.achieved_share.value(), 0.375, epsilon = 1e-12);
        // Coal: 50 units at 0.95 emissions and 0.03 fuel per unit
        assert_approx_eq!(Emissions, first.emissions, Emissions(47.5), epsilon = 1e-12);
        assert_approx_eq!(Money, first.fuel_cost, Money(1.5), epsilon = 1e-12);
        // O&M: hydro 10 * 0.03, solar 1 * 0.015, coal 20 * 0.04
        assert_approx_eq!(Money, first.om_cost, Money(1.115), epsilon = 1e-12);

        let second = &result.years[1];
        assert_eq!(second.investment, Money(2.0));
        assert_eq!(second.installed_capacity, Capacity(32.0));
        assert_eq!(second.cumulative_investment, Money(2.0));
        assert_approx_eq!(
            Emissions,
            second.cumulative_emissions,
            Emissions(95.0),
            epsilon = 1e-12
        );
    }

    #[rstest]
    fn test_cumulative_totals_are_exact_sums(
        technologies: TechnologyMap,
        pathway: Pathway,
        solution: ExpansionSolution,
    ) {
        let result = account(&technologies, &pathway, solution);
        let emissions = result
            .years
            .iter()
            .fold(Emissions(0.0), |acc, year| acc + year.emissions);
        assert_eq!(result.cumulative_emissions(), emissions);

        let investment = result
            .years
            .iter()
            .fold(Money(0.0), |acc, year| acc + year.investment);
        assert_eq!(result.cumulative_investment(), investment);

        // Fuel: coal burns 50 units at 0.03 every year
        #[allow(clippy::cast_precision_loss)]
        let expected = 1.5 * result.years.len() as f64;
        assert_approx_eq!(
            Money,
            result.cumulative_fuel_cost(),
            Money(expected),
            epsilon = 1e-9
        );
        assert!(result.cumulative_om_cost() > Money(0.0));
    }

    #[rstest]
    fn test_account_no_generation(technologies: TechnologyMap, pathway: Pathway) {
        let solution = ExpansionSolution {
            capacity: Vec::new(),
            objective: 0.0,
            energy_prices: Vec::new(),
            iterations: Vec::new(),
            converged: true,
            diagnostics: SolverDiagnostics {
                num_constraints: 0,
                num_variables: 0,
                iteration: 1,
            },
        };
        let result = account(&technologies, &pathway, solution);
        assert!(
            result
                .years
                .iter()
                .all(|year| year.achieved_share == Dimensionless(0.0))
        );
        assert_eq!(result.final_share(), Dimensionless(0.0));
    }
}
