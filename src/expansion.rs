//! The capacity expansion solver.
//!
//! Finds the least-cost sequence of capacity additions, retirements and generation which meets
//! every year's requirements along a pathway. When any technology has a learning curve, the
//! problem is re-solved with unit costs updated from the previous solution's deployment until the
//! installed capacities converge.
use crate::error::{FailureKind, ScenarioFailure};
use crate::model::ModelParameters;
use crate::pathway::Pathway;
use crate::technology::{Technology, TechnologyID, TechnologyMap};
use crate::units::{Capacity, Energy, MoneyPerCapacity, MoneyPerEnergy};
use log::{debug, warn};
use std::fmt;
use std::time::{Duration, Instant};

pub mod diagnosis;
pub mod learning;
pub mod optimisation;
use diagnosis::explain_infeasibility;
use learning::{UnitCostMap, relative_capacity_change};
use optimisation::{ExpansionProblem, Solution, SolveFailure, VariableKind};

/// The capacity and generation of one technology in one year
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityRecord {
    /// The technology
    pub technology_id: TechnologyID,
    /// Calendar year
    pub year: u32,
    /// Capacity installed at the end of the year
    pub installed: Capacity,
    /// Capacity built during the year
    pub addition: Capacity,
    /// Capacity retired during the year
    pub retirement: Capacity,
    /// Energy generated during the year
    pub generation: Energy,
    /// Unit investment cost applied to this year's additions
    pub unit_cost: MoneyPerCapacity,
}

/// Progress of one pass of the learning-curve iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// Iteration number, starting at 1
    pub iteration: u32,
    /// The objective value of this pass's solution
    pub objective: f64,
    /// Relative change in installed capacity since the previous pass
    pub capacity_change: Option<f64>,
}

/// The size of the problem and how far the solver got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverDiagnostics {
    /// Number of constraints in the linear program
    pub num_constraints: usize,
    /// Number of variables in the linear program
    pub num_variables: usize,
    /// The learning-curve iteration being solved
    pub iteration: u32,
}

/// The least-cost expansion of the fleet along one pathway
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionSolution {
    /// One record per technology per year, in year order and then catalog order
    pub capacity: Vec<CapacityRecord>,
    /// Total discounted cost
    pub objective: f64,
    /// Undiscounted shadow price of energy in each year
    pub energy_prices: Vec<(u32, MoneyPerEnergy)>,
    /// Progress of each pass of the learning-curve iteration
    pub iterations: Vec<IterationRecord>,
    /// Whether learning-curve costs converged within the iteration limit
    pub converged: bool,
    /// Diagnostics from the final solve
    pub diagnostics: SolverDiagnostics,
}

impl ExpansionSolution {
    /// The number of times the problem was solved
    pub fn num_iterations(&self) -> u32 {
        self.iterations.last().map_or(0, |record| record.iteration)
    }
}

/// Why a pathway has no solution
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionFailure {
    /// The kind of failure
    pub kind: FailureKind,
    /// A human-readable explanation
    pub reason: String,
    /// Diagnostics from the failed solve
    pub diagnostics: SolverDiagnostics,
}

impl fmt::Display for ExpansionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (constraints: {}, variables: {}, learning iteration: {})",
            self.reason,
            self.diagnostics.num_constraints,
            self.diagnostics.num_variables,
            self.diagnostics.iteration
        )
    }
}

impl From<ExpansionFailure> for ScenarioFailure {
    fn from(failure: ExpansionFailure) -> Self {
        ScenarioFailure::new(failure.kind, failure.to_string())
    }
}

/// Find the least-cost expansion of the fleet along a pathway.
///
/// Learning-curve costs are handled by fixed-point iteration: the problem is solved with the
/// current unit costs, the costs are recalculated from the resulting deployment and the problem is
/// solved again, until the largest change in installed capacity relative to the largest installed
/// capacity falls below `learning_tolerance`. If this has not happened after
/// `max_learning_iterations` passes, the last solution is returned and marked as not converged.
///
/// # Arguments
///
/// * `parameters` - Model parameters
/// * `technologies` - The technology catalog
/// * `pathway` - The yearly requirements
pub fn solve_pathway(
    parameters: &ModelParameters,
    technologies: &TechnologyMap,
    pathway: &Pathway,
) -> Result<ExpansionSolution, ExpansionFailure> {
    // No deadline if the timeout is too long to represent
    let deadline = Instant::now().checked_add(parameters.solver_timeout());
    let has_learning = technologies.values().any(Technology::has_learning);

    let mut unit_costs = UnitCostMap::initial(technologies, &pathway.horizon);
    let mut solution =
        solve_once(parameters, technologies, pathway, &unit_costs, deadline, None)?;
    loop {
        // Costs never change, so the first solution is final
        if !has_learning {
            solution.converged = true;
        }
        if solution.converged {
            return Ok(solution);
        }

        if solution.num_iterations() >= parameters.max_learning_iterations {
            warn!(
                "{}: learning-curve costs did not converge after {} iterations",
                pathway.label, parameters.max_learning_iterations
            );
            return Ok(solution);
        }

        unit_costs = UnitCostMap::from_deployment(technologies, &solution.capacity);
        solution = solve_once(
            parameters,
            technologies,
            pathway,
            &unit_costs,
            deadline,
            Some(solution),
        )?;
    }
}

/// Formulate and solve one pass of the learning-curve iteration
fn solve_once(
    parameters: &ModelParameters,
    technologies: &TechnologyMap,
    pathway: &Pathway,
    unit_costs: &UnitCostMap,
    deadline: Option<Instant>,
    previous: Option<ExpansionSolution>,
) -> Result<ExpansionSolution, ExpansionFailure> {
    let iteration = previous.as_ref().map_or(1, |prev| prev.num_iterations() + 1);
    let problem = ExpansionProblem::new(parameters, technologies, pathway).formulate(unit_costs);
    let diagnostics = SolverDiagnostics {
        num_constraints: problem.num_constraints(),
        num_variables: problem.num_variables(),
        iteration,
    };

    let remaining = deadline.map_or(Duration::MAX, |deadline| {
        deadline.saturating_duration_since(Instant::now())
    });
    if remaining.is_zero() {
        return Err(ExpansionFailure {
            kind: FailureKind::Solver,
            reason: format!(
                "timeout: no solution within {} seconds",
                parameters.solver_timeout_seconds
            ),
            diagnostics,
        });
    }

    let solution = problem.solve(remaining).map_err(|failure| {
        expansion_failure(failure, diagnostics, parameters, technologies, pathway)
    })?;
    let capacity = capacity_records(technologies, pathway, &solution, unit_costs);

    let (mut iterations, capacity_change) = match previous {
        Some(prev) => {
            let change = relative_capacity_change(&prev.capacity, &capacity);
            (prev.iterations, Some(change))
        }
        None => (Vec::new(), None),
    };
    debug!(
        "{}: learning iteration {iteration}, objective {:.6}, capacity change {:?}",
        pathway.label,
        solution.objective(),
        capacity_change
    );
    iterations.push(IterationRecord {
        iteration,
        objective: solution.objective(),
        capacity_change,
    });

    Ok(ExpansionSolution {
        capacity,
        objective: solution.objective(),
        energy_prices: solution.iter_energy_prices().collect(),
        iterations,
        converged: capacity_change
            .is_some_and(|change| change < parameters.learning_tolerance.value()),
        diagnostics,
    })
}

/// Convert a solver failure into an [`ExpansionFailure`], explaining infeasibility if possible
fn expansion_failure(
    failure: SolveFailure,
    diagnostics: SolverDiagnostics,
    parameters: &ModelParameters,
    technologies: &TechnologyMap,
    pathway: &Pathway,
) -> ExpansionFailure {
    let reason = match failure.kind {
        FailureKind::Infeasible => explain_infeasibility(parameters, technologies, pathway),
        _ => failure.reason,
    };

    ExpansionFailure {
        kind: failure.kind,
        reason,
        diagnostics,
    }
}

/// Read the capacity records from a solution.
///
/// Installed capacity is taken from the accounting identity rather than read directly, so that
/// `installed = previous + addition - retirement` holds exactly in the output.
fn capacity_records(
    technologies: &TechnologyMap,
    pathway: &Pathway,
    solution: &Solution,
    unit_costs: &UnitCostMap,
) -> Vec<CapacityRecord> {
    let mut installed: Vec<Capacity> = technologies
        .values()
        .map(|technology| technology.base_capacity)
        .collect();

    let mut records = Vec::with_capacity(technologies.len() * pathway.years.len());
    for (year_idx, year) in pathway.iter_years() {
        for (idx, technology) in technologies.values().enumerate() {
            let addition = Capacity(solution.value(VariableKind::Addition, idx, year_idx));
            let retirement = Capacity(solution.value(VariableKind::Retirement, idx, year_idx));
            installed[idx] = installed[idx] + addition - retirement;

            records.push(CapacityRecord {
                technology_id: technology.id.clone(),
                year: year.year,
                installed: installed[idx],
                addition,
                retirement,
                generation: Energy(solution.value(VariableKind::Generation, idx, year_idx)),
                unit_cost: unit_costs.get(&technology.id, year.year),
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::DemandModel;
    use crate::fixture::{model_parameters, pathway, technologies};
    use crate::pathway::PathwaySpec;
    use crate::units::Dimensionless;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_solve_pathway_without_learning(
        model_parameters: ModelParameters,
        technologies: TechnologyMap,
        pathway: Pathway,
    ) {
        let solution = solve_pathway(&model_parameters, &technologies, &pathway).unwrap();
        assert_eq!(solution.num_iterations(), 1);
        assert!(solution.converged);
        assert_eq!(
            solution.capacity.len(),
            technologies.len() * pathway.years.len()
        );

        // Capacity records are in year order, then catalog order
        let first_year = &solution.capacity[..technologies.len()];
        assert!(first_year.iter().all(|record| record.year == 2014));
        assert!(
            first_year
                .iter()
                .map(|record| &record.technology_id)
                .eq(technologies.keys())
        );
    }

    #[rstest]
    fn test_solve_pathway_accounting_identity(
        model_parameters: ModelParameters,
        technologies: TechnologyMap,
        pathway: Pathway,
    ) {
        let solution = solve_pathway(&model_parameters, &technologies, &pathway).unwrap();
        let num_technologies = technologies.len();
        for (idx, record) in solution.capacity.iter().enumerate() {
            let previous = if idx < num_technologies {
                technologies[&record.technology_id].base_capacity
            } else {
                solution.capacity[idx - num_technologies].installed
            };
            assert_eq!(
                record.installed,
                previous + record.addition - record.retirement
            );
            let max_potential = technologies[&record.technology_id].max_potential;
            assert!(record.installed <= max_potential + Capacity(1e-6));
        }
    }

    #[rstest]
    fn test_solve_pathway_with_learning(
        model_parameters: ModelParameters,
        mut technologies: TechnologyMap,
        pathway: Pathway,
    ) {
        let solar = technologies.get_mut("solar").unwrap();
        solar.learning_rate = Dimensionless(0.25);
        solar.learning_reference_capacity = Capacity(5.0);

        let solution = solve_pathway(&model_parameters, &technologies, &pathway).unwrap();
        assert!(solution.num_iterations() >= 2);
        assert!(solution.num_iterations() <= model_parameters.max_learning_iterations);
        assert_eq!(solution.iterations[0].capacity_change, None);

        // Solar costs can only fall with deployment
        let solar_costs = solution
            .capacity
            .iter()
            .filter(|record| record.technology_id == "solar".into())
            .map(|record| record.unit_cost.value())
            .collect::<Vec<_>>();
        assert!(solar_costs.windows(2).all(|pair| pair[1] <= pair[0]));
        assert_approx_eq!(f64, solar_costs[0], 0.8, epsilon = 1e-12);
    }

    #[rstest]
    fn test_solve_pathway_iteration_cap(
        mut model_parameters: ModelParameters,
        mut technologies: TechnologyMap,
        pathway: Pathway,
    ) {
        model_parameters.max_learning_iterations = 1;
        let solar = technologies.get_mut("solar").unwrap();
        solar.learning_rate = Dimensionless(0.25);

        let solution = solve_pathway(&model_parameters, &technologies, &pathway).unwrap();
        assert_eq!(solution.num_iterations(), 1);
        assert!(!solution.converged);
    }

    #[rstest]
    fn test_solve_pathway_infeasible(
        model_parameters: ModelParameters,
        mut technologies: TechnologyMap,
    ) {
        // Renewables cannot reach 100% with potentials this small
        technologies.get_mut("hydro").unwrap().max_potential = Capacity(12.0);
        technologies.get_mut("solar").unwrap().max_potential = Capacity(5.0);
        let spec = PathwaySpec {
            label: "REN100_test".into(),
            target_share: Dimensionless(1.0),
            demand_model: DemandModel::CompoundGrowth { growth_rate: 0.04 },
        };
        let pathway = Pathway::build(&model_parameters, Energy(100.0), &spec).unwrap();

        let failure = solve_pathway(&model_parameters, &technologies, &pathway).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Infeasible);
        assert!(failure.reason.starts_with("renewable target 100% infeasible in "));
        assert!(failure.reason.contains("hydro: potential"));
        assert!(failure.diagnostics.num_constraints > 0);

        let scenario_failure = ScenarioFailure::from(failure);
        assert_eq!(scenario_failure.kind, FailureKind::Infeasible);
        assert!(scenario_failure.diagnostic.contains("learning iteration: 1"));
    }

    #[rstest]
    fn test_solve_pathway_timeout(
        mut model_parameters: ModelParameters,
        technologies: TechnologyMap,
        pathway: Pathway,
    ) {
        model_parameters.solver_timeout_seconds = 1e-9;

        let failure = solve_pathway(&model_parameters, &technologies, &pathway).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Solver);
        assert!(failure.reason.starts_with("timeout:"));
        assert_eq!(failure.diagnostics.iteration, 1);
        assert!(failure.diagnostics.num_constraints > 0);
        assert_eq!(
            failure.diagnostics.num_variables,
            4 * technologies.len() * pathway.years.len()
        );

        let scenario_failure = ScenarioFailure::from(failure);
        assert_eq!(scenario_failure.kind, FailureKind::Solver);
        assert!(scenario_failure.diagnostic.contains("constraints: "));
        assert!(scenario_failure.diagnostic.contains("variables: "));
    }

    #[rstest]
    fn test_solve_pathway_unrepresentable_timeout(
        mut model_parameters: ModelParameters,
        technologies: TechnologyMap,
        pathway: Pathway,
    ) {
        model_parameters.solver_timeout_seconds = 1e20;
        let solution = solve_pathway(&model_parameters, &technologies, &pathway).unwrap();
        assert!(solution.converged);
    }
}
