//! Code for formulating and solving the capacity expansion linear program.
//!
//! The problem moves through three stages, each with its own type: an [`ExpansionProblem`] holds
//! the inputs, [`ExpansionProblem::formulate`] turns it into a [`FormulatedProblem`] with concrete
//! unit costs and [`FormulatedProblem::solve`] consumes that to give either a [`Solution`] or a
//! [`SolveFailure`]. A problem can therefore only be solved once it has been formulated, and only
//! once.
use super::learning::UnitCostMap;
use crate::error::FailureKind;
use crate::finance::discount_factor;
use crate::model::ModelParameters;
use crate::pathway::Pathway;
use crate::technology::{Technology, TechnologyMap};
use crate::units::{Dimensionless, MoneyPerEnergy};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;
use std::ops::RangeBounds;
use std::time::Duration;

pub mod constraints;
use constraints::{ConstraintKeys, add_expansion_constraints};

/// Values closer to zero than this are reported as zero
const SOLUTION_EPSILON: f64 = 1e-9;

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
type Variable = highs::Col;

/// The quantity a variable represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Capacity installed at the end of the year
    Installed,
    /// Capacity built during the year
    Addition,
    /// Capacity retired during the year
    Retirement,
    /// Energy generated during the year
    Generation,
}

/// A key for a [`VariableMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VariableMapKey {
    kind: VariableKind,
    technology_idx: usize,
    year_idx: usize,
}

/// A map for easy lookup of variables in the problem.
///
/// Technologies and years are identified by their position in the catalog and in the pathway. The
/// entries are in the same order as the columns of the problem, so the position of a key is also
/// the position of its value in the solution.
#[derive(Default)]
pub struct VariableMap {
    variables: IndexMap<VariableMapKey, Variable>,
    coefficients: Vec<f64>,
}

impl VariableMap {
    /// Add a new column to the problem
    fn add<B: RangeBounds<f64>>(
        &mut self,
        problem: &mut Problem,
        key: VariableMapKey,
        coefficient: f64,
        bounds: B,
    ) {
        let var = problem.add_column(coefficient, bounds);
        let existing = self.variables.insert(key, var).is_some();
        assert!(!existing, "Duplicate entry for var");
        self.coefficients.push(coefficient);
    }

    /// Get the [`Variable`] corresponding to the given parameters.
    pub fn get(&self, kind: VariableKind, technology_idx: usize, year_idx: usize) -> Variable {
        *self
            .variables
            .get(&VariableMapKey {
                kind,
                technology_idx,
                year_idx,
            })
            .expect("No variable found for given params")
    }

    /// The column index of the given variable
    fn column_index(&self, kind: VariableKind, technology_idx: usize, year_idx: usize) -> usize {
        self.variables
            .get_index_of(&VariableMapKey {
                kind,
                technology_idx,
                year_idx,
            })
            .expect("No variable found for given params")
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether there are no variables
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// The inputs for one capacity expansion problem
#[derive(Clone, Copy)]
pub struct ExpansionProblem<'a> {
    parameters: &'a ModelParameters,
    technologies: &'a TechnologyMap,
    pathway: &'a Pathway,
}

impl<'a> ExpansionProblem<'a> {
    /// Create a new [`ExpansionProblem`]
    pub fn new(
        parameters: &'a ModelParameters,
        technologies: &'a TechnologyMap,
        pathway: &'a Pathway,
    ) -> Self {
        Self {
            parameters,
            technologies,
            pathway,
        }
    }

    /// Build the linear program, using the given unit investment costs.
    ///
    /// For each technology and year there are four variables: installed capacity, additions,
    /// retirements and generation. The objective is the discounted sum of investment, O&M and
    /// generation costs.
    pub fn formulate(self, unit_costs: &UnitCostMap) -> FormulatedProblem<'a> {
        let mut problem = Problem::default();
        let variables = add_variables(&mut problem, &self, unit_costs);
        let constraint_keys = add_expansion_constraints(&mut problem, &variables, &self);

        FormulatedProblem {
            problem,
            variables,
            constraint_keys,
            context: self,
        }
    }

    /// Iterate over technologies, along with their position in the catalog
    fn iter_technologies(&self) -> impl Iterator<Item = (usize, &'a Technology)> + use<'a> {
        self.technologies.values().enumerate()
    }

    /// The discount factor for the year at the given position in the pathway
    fn discount_factor(&self, year_idx: usize) -> Dimensionless {
        let years_elapsed = u32::try_from(year_idx).unwrap_or(u32::MAX);
        discount_factor(self.parameters.discount_rate, years_elapsed)
    }
}

/// An expansion problem which is ready to solve
pub struct FormulatedProblem<'a> {
    problem: Problem,
    variables: VariableMap,
    constraint_keys: ConstraintKeys,
    context: ExpansionProblem<'a>,
}

impl FormulatedProblem<'_> {
    /// The number of constraints in the problem
    pub fn num_constraints(&self) -> usize {
        self.problem.num_rows()
    }

    /// The number of variables in the problem
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Solve the problem.
    ///
    /// The solver runs single-threaded with a fixed random seed, so that solving the same problem
    /// twice gives the same answer.
    ///
    /// # Arguments
    ///
    /// * `time_limit` - The longest the solver may run for
    pub fn solve(self, time_limit: Duration) -> Result<Solution, SolveFailure> {
        let FormulatedProblem {
            problem,
            variables,
            constraint_keys,
            context,
        } = self;

        let mut highs_model = problem.optimise(Sense::Minimise);
        configure_solver(&mut highs_model, time_limit);

        let solved = highs_model.try_solve().map_err(|status| {
            SolveFailure::new(
                FailureKind::Solver,
                format!("Could not solve: {status:?}"),
            )
        })?;
        match solved.status() {
            HighsModelStatus::Optimal => {}
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                return Err(SolveFailure::new(
                    FailureKind::Infeasible,
                    "The constraints cannot be satisfied together",
                ));
            }
            HighsModelStatus::Unbounded => {
                return Err(SolveFailure::new(
                    FailureKind::Unbounded,
                    "The objective can be decreased without limit",
                ));
            }
            HighsModelStatus::ReachedTimeLimit => {
                return Err(SolveFailure::new(
                    FailureKind::Solver,
                    format!(
                        "timeout: no solution within {:.1} seconds",
                        time_limit.as_secs_f64()
                    ),
                ));
            }
            status => {
                return Err(SolveFailure::new(
                    FailureKind::Solver,
                    format!("Could not solve: {status:?}"),
                ));
            }
        }

        let solution = solved.get_solution();
        let columns = solution.columns().to_vec();
        let objective = variables
            .coefficients
            .iter()
            .zip(&columns)
            .map(|(coeff, value)| coeff * value)
            .sum();

        // Dual values of the energy balance are discounted prices, so undo the discounting
        let energy_prices = constraint_keys
            .energy_balance_keys
            .zip_duals(solution.dual_rows())
            .map(|(&year_idx, dual)| {
                let year = context.pathway.years[year_idx].year;
                let price = dual / context.discount_factor(year_idx).value();
                (year, MoneyPerEnergy(price))
            })
            .collect();

        Ok(Solution {
            columns,
            variables,
            objective,
            energy_prices,
        })
    }
}

/// Set the solver options.
fn configure_solver(highs_model: &mut highs::Model, time_limit: Duration) {
    // HiGHS writes straight to stdout, bypassing our logger
    highs_model.set_option("output_flag", false);
    highs_model.set_option("parallel", "off");
    highs_model.set_option("threads", 1);
    highs_model.set_option("random_seed", 0);
    highs_model.set_option("time_limit", time_limit.as_secs_f64());
}

/// Why a problem could not be solved
#[derive(Debug, Clone, PartialEq)]
pub struct SolveFailure {
    /// The kind of failure. Never [`FailureKind::Parameter`].
    pub kind: FailureKind,
    /// Explanation from the solver
    pub reason: String,
}

impl SolveFailure {
    fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// The optimal solution to an expansion problem
pub struct Solution {
    columns: Vec<f64>,
    variables: VariableMap,
    objective: f64,
    energy_prices: Vec<(u32, MoneyPerEnergy)>,
}

impl Solution {
    /// The value of the objective function (total discounted cost)
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// The value of a variable, with solver noise around zero removed.
    ///
    /// Every variable is bounded below by zero, so small negative values are clamped.
    pub fn value(&self, kind: VariableKind, technology_idx: usize, year_idx: usize) -> f64 {
        let column = self.variables.column_index(kind, technology_idx, year_idx);
        let value = self.columns[column].max(0.0);
        if value < SOLUTION_EPSILON {
            0.0
        } else {
            value
        }
    }

    /// Iterate over the shadow price of energy in each year.
    ///
    /// This is the cost of meeting one more unit of demand in that year, in undiscounted terms.
    pub fn iter_energy_prices(&self) -> impl Iterator<Item = (u32, MoneyPerEnergy)> + '_ {
        self.energy_prices.iter().copied()
    }
}

/// Add variables to the optimisation problem.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `context` - The inputs to the problem
/// * `unit_costs` - Unit investment cost for each technology and year
///
/// # Returns
///
/// A [`VariableMap`] with the problem's variables as values.
fn add_variables(
    problem: &mut Problem,
    context: &ExpansionProblem,
    unit_costs: &UnitCostMap,
) -> VariableMap {
    let mut variables = VariableMap::default();
    let carbon_price = context.parameters.carbon_price;

    for (year_idx, year) in context.pathway.iter_years() {
        let df = context.discount_factor(year_idx).value();
        for (technology_idx, technology) in context.iter_technologies() {
            let key = |kind| VariableMapKey {
                kind,
                technology_idx,
                year_idx,
            };
            let unit_cost = unit_costs.get(&technology.id, year.year);
            let generation_cost = technology.generation_cost(carbon_price);

            // The base-year fleet is fixed: nothing can be built or retired
            let (installed, max_addition, max_retirement) = if year_idx == 0 {
                let base = technology.base_capacity.value();
                (base..=base, 0.0, 0.0)
            } else {
                (
                    0.0..=technology.max_potential.value(),
                    technology.max_annual_build.value(),
                    f64::INFINITY,
                )
            };

            let om_coeff = df * technology.om_cost.value();
            variables.add(problem, key(VariableKind::Installed), om_coeff, installed);
            let addition_coeff = df * unit_cost.value();
            variables.add(problem, key(VariableKind::Addition), addition_coeff, 0.0..=max_addition);
            variables.add(problem, key(VariableKind::Retirement), 0.0, 0.0..=max_retirement);
            let generation_coeff = df * generation_cost.value();
            variables.add(problem, key(VariableKind::Generation), generation_coeff, 0.0..);
        }
    }

    variables
}
