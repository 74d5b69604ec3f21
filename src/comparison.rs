//! The cross-scenario comparison table.
//!
//! This is the hand-off point to reporting tools, so every scenario in the matrix has a row,
//! including those which failed.
use crate::accounting::ScenarioResult;
use crate::error::FailureKind;
use crate::scenario::Scenario;
use crate::simulation::ScenarioRun;
use crate::units::{Dimensionless, Emissions, Money};
use indexmap::IndexMap;
use serde_string_enum::SerializeLabeledStringEnum;

/// Whether a scenario produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum)]
pub enum ScenarioStatus {
    /// An optimal solution was found
    #[string = "optimal"]
    Optimal,
    /// See the failure kind and diagnostic
    #[string = "failed"]
    Failed,
}

/// Figures for a successfully solved scenario
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedFigures {
    /// Renewable share achieved in the final year
    pub final_share: Dimensionless,
    /// Achieved minus target share in the final year
    pub share_gap: Dimensionless,
    /// Investment over the whole horizon
    pub cumulative_investment: Money,
    /// Position when solved scenarios are ordered by cumulative investment (1 = cheapest)
    pub investment_rank: usize,
    /// Operation and maintenance cost over the whole horizon
    pub cumulative_om_cost: Money,
    /// Fuel cost over the whole horizon
    pub cumulative_fuel_cost: Money,
    /// Emissions over the whole horizon
    pub cumulative_emissions: Emissions,
    /// The scenario emissions are compared against
    pub baseline: Scenario,
    /// Baseline cumulative emissions minus this scenario's
    pub emissions_reduction: Emissions,
    /// `emissions_reduction` as a percentage of the baseline's emissions, if they are non-zero
    pub emissions_reduction_percent: Option<f64>,
    /// Total discounted cost
    pub objective: f64,
    /// The number of times the expansion problem was solved
    pub learning_iterations: usize,
    /// Whether learning-curve costs converged
    pub converged: bool,
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    /// The scenario
    pub scenario: Scenario,
    /// The renewable share targeted in the final year
    pub target_share: Dimensionless,
    /// Figures for a solved scenario, or the reason it failed
    pub outcome: Result<SolvedFigures, (FailureKind, String)>,
}

impl ComparisonRow {
    /// Whether the scenario was solved
    pub fn status(&self) -> ScenarioStatus {
        match self.outcome {
            Ok(_) => ScenarioStatus::Optimal,
            Err(_) => ScenarioStatus::Failed,
        }
    }

    /// Figures for a solved scenario
    pub fn figures(&self) -> Option<&SolvedFigures> {
        self.outcome.as_ref().ok()
    }
}

/// The comparison table, keyed by scenario in matrix order
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable(IndexMap<Scenario, ComparisonRow>);

impl ComparisonTable {
    /// Build the comparison table from the outcome of every scenario.
    ///
    /// The baseline for each scenario is the solved scenario with the same demand path and the
    /// lowest renewable target. Ties in cumulative investment keep matrix order when ranking.
    pub fn new(runs: &[ScenarioRun]) -> Self {
        let ranks = investment_ranks(runs);

        let mut baselines: IndexMap<_, &ScenarioRun> = IndexMap::new();
        for run in runs.iter().filter(|run| run.outcome.is_ok()) {
            let baseline = baselines.entry(run.scenario.demand_path).or_insert(run);
            if run.scenario.renewable_target < baseline.scenario.renewable_target {
                *baseline = run;
            }
        }

        let rows = runs.iter().map(|run| {
            let outcome = match &run.outcome {
                Ok(result) => {
                    let baseline = baselines[&run.scenario.demand_path];
                    let baseline_emissions = baseline
                        .result()
                        .map_or(Emissions(0.0), ScenarioResult::cumulative_emissions);
                    let cumulative_emissions = result.cumulative_emissions();
                    let emissions_reduction = baseline_emissions - cumulative_emissions;
                    let emissions_reduction_percent = (baseline_emissions != Emissions(0.0))
                        .then(|| (emissions_reduction / baseline_emissions).value() * 100.0);
                    let final_share = result.final_share();

                    Ok(SolvedFigures {
                        final_share,
                        share_gap: final_share - result.target_share,
                        cumulative_investment: result.cumulative_investment(),
                        investment_rank: ranks[&run.scenario],
                        cumulative_om_cost: result.cumulative_om_cost(),
                        cumulative_fuel_cost: result.cumulative_fuel_cost(),
                        cumulative_emissions,
                        baseline: baseline.scenario,
                        emissions_reduction,
                        emissions_reduction_percent,
                        objective: result.objective,
                        learning_iterations: result.num_iterations(),
                        converged: result.converged,
                    })
                }
                Err(failure) => Err((failure.kind, failure.diagnostic.clone())),
            };

            let row = ComparisonRow {
                scenario: run.scenario,
                target_share: run.scenario.renewable_target.share(),
                outcome,
            };
            (run.scenario, row)
        });

        Self(rows.collect())
    }

    /// Get the row for a scenario
    pub fn get(&self, scenario: &Scenario) -> Option<&ComparisonRow> {
        self.0.get(scenario)
    }

    /// Iterate over the rows in matrix order
    pub fn iter(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.0.values()
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Rank solved scenarios by cumulative investment, cheapest first
fn investment_ranks(runs: &[ScenarioRun]) -> IndexMap<Scenario, usize> {
    let mut solved = runs
        .iter()
        .filter_map(|run| Some((run.scenario, run.result()?.cumulative_investment())))
        .collect::<Vec<_>>();

    // Stable, so ties keep matrix order
    solved.sort_by(|(_, a), (_, b)| a.value().total_cmp(&b.value()));

    solved
        .into_iter()
        .enumerate()
        .map(|(idx, (scenario, _))| (scenario, idx + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::YearRecord;
    use crate::error::ScenarioFailure;
    use crate::scenario::{DemandPath, RenewableTarget};
    use crate::units::{Capacity, Energy};
    use float_cmp::assert_approx_eq;

    fn result(target: RenewableTarget, investment: f64, emissions: f64) -> ScenarioResult {
        let year = YearRecord {
            year: 2050,
            demand: Energy(100.0),
            demand_per_capita: None,
            peak_demand: Capacity(10.0),
            reserve_margin: Dimensionless(0.1),
            required_capacity: Capacity(11.0),
            system_losses: Dimensionless(0.05),
            installed_capacity: Capacity(12.0),
            generation: Energy(105.0),
            renewable_generation: Energy(105.0 * target.share().value()),
            target_share: target.share(),
            achieved_share: target.share(),
            investment: Money(investment),
            om_cost: Money(1.5),
            fuel_cost: Money(emissions / 100.0),
            emissions: Emissions(emissions),
            cumulative_investment: Money(investment),
            cumulative_emissions: Emissions(emissions),
        };

        ScenarioResult {
            label: String::new(),
            target_share: target.share(),
            years: vec![year],
            capacity: Vec::new(),
            objective: investment,
            energy_prices: Vec::new(),
            iterations: Vec::new(),
            converged: true,
        }
    }

    fn run(
        target: RenewableTarget,
        path: DemandPath,
        outcome: Result<ScenarioResult, ScenarioFailure>,
    ) -> ScenarioRun {
        ScenarioRun {
            scenario: Scenario::new(target, path),
            outcome,
        }
    }

    #[test]
    fn test_comparison_table() {
        use DemandPath::{BusinessAsUsual as Bau, High};
        use RenewableTarget::{Ren30, Ren50, Ren70};

        let runs = [
            run(
                Ren30,
                Bau,
                Err(ScenarioFailure::new(FailureKind::Solver, "timeout")),
            ),
            run(Ren50, Bau, Ok(result(Ren50, 20.0, 200.0))),
            run(Ren70, Bau, Ok(result(Ren70, 30.0, 150.0))),
            run(Ren30, High, Ok(result(Ren30, 20.0, 0.0))),
            run(Ren50, High, Ok(result(Ren50, 10.0, 0.0))),
        ];
        let table = ComparisonTable::new(&runs);

        assert_eq!(table.len(), 5);
        assert!(
            table
                .iter()
                .map(|row| row.scenario)
                .eq(runs.iter().map(|run| run.scenario))
        );

        // Failed rows are labelled
        let failed = table.get(&Scenario::new(Ren30, Bau)).unwrap();
        assert_eq!(failed.status(), ScenarioStatus::Failed);
        assert_eq!(
            failed.outcome,
            Err((FailureKind::Solver, "timeout".to_string()))
        );

        // REN30_BAU failed, so REN50_BAU is the baseline for BAU
        let figures = table.get(&Scenario::new(Ren70, Bau)).unwrap().figures().unwrap();
        assert_eq!(figures.baseline, Scenario::new(Ren50, Bau));
        assert_eq!(figures.emissions_reduction, Emissions(50.0));
        assert_approx_eq!(
            f64,
            figures.emissions_reduction_percent.unwrap(),
            25.0,
            epsilon = 1e-12
        );
        assert_eq!(figures.investment_rank, 4);
        assert_eq!(figures.cumulative_om_cost, Money(1.5));
        assert_eq!(figures.cumulative_fuel_cost, Money(1.5));

        // Zero baseline emissions give no percentage
        let figures = table.get(&Scenario::new(Ren50, High)).unwrap().figures().unwrap();
        assert_eq!(figures.baseline, Scenario::new(Ren30, High));
        assert_eq!(figures.emissions_reduction_percent, None);
        assert_eq!(figures.investment_rank, 1);

        // Ties keep matrix order
        let rank = |target, path| {
            table
                .get(&Scenario::new(target, path))
                .unwrap()
                .figures()
                .unwrap()
                .investment_rank
        };
        assert_eq!(rank(Ren50, Bau), 2);
        assert_eq!(rank(Ren30, High), 3);
    }
}
