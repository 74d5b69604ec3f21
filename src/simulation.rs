//! Functionality for running the scenario matrix.
//!
//! Each scenario is built and solved independently of the others, so the scenarios are spread
//! across a thread pool. Only the model is shared between them and it is never modified. Results
//! are collected in matrix order once every scenario has finished, so the output does not depend
//! on the number of threads.
use crate::accounting::{ScenarioResult, account};
use crate::comparison::ComparisonTable;
use crate::error::{ScenarioFailure, SchemaError};
use crate::expansion::solve_pathway;
use crate::model::Model;
use crate::output::DataWriter;
use crate::output::metadata::write_metadata;
use crate::pathway::Pathway;
use crate::scenario::Scenario;
use anyhow::{Context, Result, ensure};
use log::{info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::path::Path;

/// The outcome of running a single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRun {
    /// The scenario which was run
    pub scenario: Scenario,
    /// The result, or why there isn't one
    pub outcome: Result<ScenarioResult, ScenarioFailure>,
}

impl ScenarioRun {
    /// The result, if the scenario was solved
    pub fn result(&self) -> Option<&ScenarioResult> {
        self.outcome.as_ref().ok()
    }
}

/// Build, solve and account for a single scenario.
///
/// # Arguments
///
/// * `model` - The model
/// * `scenario` - The scenario to run
///
/// # Returns
///
/// The scenario's result, or a [`ScenarioFailure`] if its inputs are out of range or the expansion
/// problem has no optimal solution.
pub fn run_scenario(model: &Model, scenario: &Scenario) -> Result<ScenarioResult, ScenarioFailure> {
    let pathway = Pathway::for_scenario(model, scenario)
        .map_err(|err| ScenarioFailure::from_construction_error(&err))?;
    let solution = solve_pathway(&model.parameters, &model.technologies, &pathway)?;

    Ok(account(&model.technologies, &pathway, solution))
}

/// Run every scenario in the model's matrix.
///
/// # Arguments
///
/// * `model` - The model
/// * `num_threads` - Size of the thread pool. Zero means one thread per CPU.
///
/// # Returns
///
/// One [`ScenarioRun`] per scenario, in matrix order. Failed scenarios are included. An error is
/// only returned if the matrix is empty or the thread pool cannot be created.
pub fn run_scenarios(model: &Model, num_threads: usize) -> Result<Vec<ScenarioRun>> {
    ensure!(
        !model.scenarios.is_empty(),
        SchemaError::new("Scenario matrix is empty")
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;
    let runs = pool.install(|| {
        model
            .scenarios
            .par_iter()
            .map(|scenario| {
                info!("Running scenario {scenario}");
                let outcome = run_scenario(model, scenario);
                match &outcome {
                    Ok(result) => info!(
                        "Scenario {scenario} solved: final renewable share {:.3}, objective {:.3}",
                        result.final_share().value(),
                        result.objective
                    ),
                    Err(failure) => warn!("Scenario {scenario} failed: {failure}"),
                }

                ScenarioRun {
                    scenario: *scenario,
                    outcome,
                }
            })
            .collect::<Vec<_>>()
    });

    Ok(runs)
}

/// Run the scenario matrix and write the results.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. learning iterations) to file
/// * `num_threads` - Size of the thread pool. Zero means one thread per CPU.
pub fn run(model: &Model, output_path: &Path, debug_model: bool, num_threads: usize) -> Result<()> {
    write_metadata(output_path, &model.model_path).context("Failed to save metadata")?;

    let runs = run_scenarios(model, num_threads)?;
    let comparison = ComparisonTable::new(&runs);

    let mut writer = DataWriter::create(output_path, debug_model)?;
    for run in &runs {
        if let Some(result) = run.result() {
            writer.write_scenario(&run.scenario, result)?;
        }
    }
    writer.write_comparison(&comparison)?;
    writer.flush()?;

    let num_solved = runs.iter().filter(|run| run.outcome.is_ok()).count();
    info!("{num_solved} of {} scenarios solved", runs.len());
    if num_solved < runs.len() {
        warn!("Failed scenarios are labelled in the scenario comparison file");
    }

    Ok(())
}
