//! Code for adding constraints to the capacity expansion problem.
use super::{ExpansionProblem, VariableKind, VariableMap};
use crate::units::Dimensionless;
use highs::RowProblem as Problem;

/// Corresponding variables for a constraint along with the row offset in the solution
pub struct KeysWithOffset<T> {
    offset: usize,
    keys: Vec<T>,
}

impl<T> KeysWithOffset<T> {
    /// Zip the keys with the corresponding dual values in the solution, accounting for the offset
    pub fn zip_duals<'a>(&'a self, duals: &'a [f64]) -> impl Iterator<Item = (&'a T, f64)> {
        assert!(
            self.offset + self.keys.len() <= duals.len(),
            "Bad constraint keys: dual rows out of range"
        );

        self.keys.iter().zip(duals[self.offset..].iter().copied())
    }
}

/// Indicates the position in the pathway of the year covered by each energy balance constraint
pub type EnergyBalanceKeys = KeysWithOffset<usize>;

/// The keys for different constraints
pub struct ConstraintKeys {
    /// Keys for energy balance constraints
    pub energy_balance_keys: EnergyBalanceKeys,
}

/// Add all constraints to the problem.
///
/// Note: the ordering of constraints is important, as the dual values of the energy balance
/// constraints are later retrieved to calculate energy prices.
///
/// # Arguments:
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `context` - The inputs to the problem
///
/// # Returns:
///
/// The keys for the energy balance constraints
pub fn add_expansion_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    context: &ExpansionProblem,
) -> ConstraintKeys {
    let energy_balance_keys = add_energy_balance_constraints(problem, variables, context);
    add_capacity_accounting_constraints(problem, variables, context);
    add_adequacy_constraints(problem, variables, context);
    add_generation_limit_constraints(problem, variables, context);
    add_renewable_share_constraints(problem, variables, context);

    ConstraintKeys {
        energy_balance_keys,
    }
}

/// Add energy balance constraints: total generation must cover demand plus losses.
fn add_energy_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    context: &ExpansionProblem,
) -> EnergyBalanceKeys {
    // Sanity check: we rely on the first n values of the dual row values corresponding to the
    // energy balance constraints, so these must be the first rows
    assert!(
        problem.num_rows() == 0,
        "Energy balance constraints must be added before other constraints"
    );

    let mut keys = Vec::new();
    for (year_idx, year) in context.pathway.iter_years() {
        let terms = context
            .iter_technologies()
            .map(|(idx, _)| (variables.get(VariableKind::Generation, idx, year_idx), 1.0))
            .collect::<Vec<_>>();
        problem.add_row(year.required_generation.value().., terms);
        keys.push(year_idx);
    }

    KeysWithOffset { offset: 0, keys }
}

/// Add capacity accounting constraints linking each year's installed capacity to the previous
/// year's.
///
/// ```text
/// installed[t] - installed[t-1] - addition[t] + retirement[t] = 0
/// ```
///
/// The base year has no constraint as its installed capacity is fixed.
fn add_capacity_accounting_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    context: &ExpansionProblem,
) {
    for (year_idx, _) in context.pathway.iter_years().skip(1) {
        for (idx, _) in context.iter_technologies() {
            problem.add_row(
                0.0..=0.0,
                [
                    (variables.get(VariableKind::Installed, idx, year_idx), 1.0),
                    (variables.get(VariableKind::Installed, idx, year_idx - 1), -1.0),
                    (variables.get(VariableKind::Addition, idx, year_idx), -1.0),
                    (variables.get(VariableKind::Retirement, idx, year_idx), 1.0),
                ],
            );
        }
    }
}

/// Add adequacy constraints: installed capacity must cover peak demand plus the reserve margin.
fn add_adequacy_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    context: &ExpansionProblem,
) {
    for (year_idx, year) in context.pathway.iter_years() {
        let terms = context
            .iter_technologies()
            .map(|(idx, _)| (variables.get(VariableKind::Installed, idx, year_idx), 1.0))
            .collect::<Vec<_>>();
        problem.add_row(year.required_capacity.value().., terms);
    }
}

/// Add generation limits: no technology can generate more than its capacity factor allows.
///
/// ```text
/// generation[i, t] - CF[i] * hours / 1000 * installed[i, t] <= 0
/// ```
fn add_generation_limit_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    context: &ExpansionProblem,
) {
    let hours_per_year = context.parameters.hours_per_year;
    for (year_idx, _) in context.pathway.iter_years() {
        for (idx, technology) in context.iter_technologies() {
            let energy_per_capacity = technology.annual_energy_per_capacity(hours_per_year);
            problem.add_row(
                ..=0.0,
                [
                    (variables.get(VariableKind::Generation, idx, year_idx), 1.0),
                    (
                        variables.get(VariableKind::Installed, idx, year_idx),
                        -energy_per_capacity,
                    ),
                ],
            );
        }
    }
}

/// Add the renewable share band: in each year, the renewable share of generation must lie within
/// the tolerance of the target trajectory.
///
/// Each side of the band is written as a linear constraint, e.g. for the lower bound:
///
/// ```text
/// R - (share - tolerance) * G >= 0
/// ```
///
/// where `R` is renewable generation and `G` is total generation. The band is clamped to [0, 1].
fn add_renewable_share_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    context: &ExpansionProblem,
) {
    let tolerance = context.parameters.renewable_tolerance;
    for (year_idx, year) in context.pathway.iter_years() {
        let lower = (year.target_share - tolerance).max(Dimensionless(0.0));
        let upper = (year.target_share + tolerance).min(Dimensionless(1.0));

        let terms = |bound: Dimensionless| {
            context
                .iter_technologies()
                .map(|(idx, technology)| {
                    let renewable = if technology.is_renewable() { 1.0 } else { 0.0 };
                    let var = variables.get(VariableKind::Generation, idx, year_idx);
                    (var, renewable - bound.value())
                })
                .collect::<Vec<_>>()
        };

        problem.add_row(0.0.., terms(lower));
        problem.add_row(..=0.0, terms(upper));
    }
}
