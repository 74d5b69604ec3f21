//! The module responsible for writing output data to disk.
use crate::accounting::{ScenarioResult, YearRecord};
use crate::comparison::{ComparisonRow, ComparisonTable, ScenarioStatus};
use crate::error::FailureKind;
use crate::expansion::{CapacityRecord, IterationRecord};
use crate::scenario::{DemandPath, RenewableTarget, Scenario};
use crate::technology::TechnologyID;
use crate::units::{
    Capacity, Dimensionless, Emissions, Energy, Money, MoneyPerCapacity, MoneyPerEnergy,
};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "powerpath_results";

/// The output file name for yearly totals
const YEARLY_RESULTS_FILE_NAME: &str = "yearly_results.csv";

/// The output file name for per-technology results
const TECHNOLOGY_RESULTS_FILE_NAME: &str = "technology_results.csv";

/// The output file name for the scenario comparison table
const SCENARIO_COMPARISON_FILE_NAME: &str = "scenario_comparison.csv";

/// The output file name for learning-curve iterations
const LEARNING_ITERATIONS_FILE_NAME: &str = "debug_learning_iterations.csv";

/// The output file name for energy prices
const ENERGY_PRICES_FILE_NAME: &str = "debug_energy_prices.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the yearly results CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct YearlyResultRow {
    scenario: String,
    year: u32,
    demand: Energy,
    demand_per_capita: Option<f64>,
    peak_demand: Capacity,
    reserve_margin: Dimensionless,
    required_capacity: Capacity,
    system_losses: Dimensionless,
    installed_capacity: Capacity,
    generation: Energy,
    renewable_generation: Energy,
    target_share: Dimensionless,
    achieved_share: Dimensionless,
    investment: Money,
    om_cost: Money,
    fuel_cost: Money,
    emissions: Emissions,
    cumulative_investment: Money,
    cumulative_emissions: Emissions,
}

impl YearlyResultRow {
    fn new(scenario: &Scenario, record: &YearRecord) -> Self {
        Self {
            scenario: scenario.to_string(),
            year: record.year,
            demand: record.demand,
            demand_per_capita: record.demand_per_capita,
            peak_demand: record.peak_demand,
            reserve_margin: record.reserve_margin,
            required_capacity: record.required_capacity,
            system_losses: record.system_losses,
            installed_capacity: record.installed_capacity,
            generation: record.generation,
            renewable_generation: record.renewable_generation,
            target_share: record.target_share,
            achieved_share: record.achieved_share,
            investment: record.investment,
            om_cost: record.om_cost,
            fuel_cost: record.fuel_cost,
            emissions: record.emissions,
            cumulative_investment: record.cumulative_investment,
            cumulative_emissions: record.cumulative_emissions,
        }
    }
}

/// Represents a row in the technology results CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TechnologyResultRow {
    scenario: String,
    technology_id: TechnologyID,
    year: u32,
    installed: Capacity,
    addition: Capacity,
    retirement: Capacity,
    generation: Energy,
    unit_cost: MoneyPerCapacity,
}

impl TechnologyResultRow {
    fn new(scenario: &Scenario, record: &CapacityRecord) -> Self {
        Self {
            scenario: scenario.to_string(),
            technology_id: record.technology_id.clone(),
            year: record.year,
            installed: record.installed,
            addition: record.addition,
            retirement: record.retirement,
            generation: record.generation,
            unit_cost: record.unit_cost,
        }
    }
}

/// Represents a row in the scenario comparison CSV file.
///
/// Fields which only make sense for solved scenarios are left empty for failed ones.
#[derive(Serialize, Debug)]
struct ScenarioComparisonRow {
    scenario: String,
    renewable_target: RenewableTarget,
    demand_path: DemandPath,
    status: ScenarioStatus,
    failure_kind: Option<FailureKind>,
    diagnostic: Option<String>,
    target_share: Dimensionless,
    final_share: Option<Dimensionless>,
    share_gap: Option<Dimensionless>,
    cumulative_investment: Option<Money>,
    investment_rank: Option<usize>,
    cumulative_om_cost: Option<Money>,
    cumulative_fuel_cost: Option<Money>,
    cumulative_emissions: Option<Emissions>,
    baseline: Option<String>,
    emissions_reduction: Option<Emissions>,
    emissions_reduction_percent: Option<f64>,
    objective: Option<f64>,
    learning_iterations: Option<usize>,
    converged: Option<bool>,
}

impl ScenarioComparisonRow {
    fn new(row: &ComparisonRow) -> Self {
        let figures = row.figures();
        let (failure_kind, diagnostic) = match &row.outcome {
            Ok(_) => (None, None),
            Err((kind, diagnostic)) => (Some(*kind), Some(diagnostic.clone())),
        };

        Self {
            scenario: row.scenario.to_string(),
            renewable_target: row.scenario.renewable_target,
            demand_path: row.scenario.demand_path,
            status: row.status(),
            failure_kind,
            diagnostic,
            target_share: row.target_share,
            final_share: figures.map(|f| f.final_share),
            share_gap: figures.map(|f| f.share_gap),
            cumulative_investment: figures.map(|f| f.cumulative_investment),
            investment_rank: figures.map(|f| f.investment_rank),
            cumulative_om_cost: figures.map(|f| f.cumulative_om_cost),
            cumulative_fuel_cost: figures.map(|f| f.cumulative_fuel_cost),
            cumulative_emissions: figures.map(|f| f.cumulative_emissions),
            baseline: figures.map(|f| f.baseline.to_string()),
            emissions_reduction: figures.map(|f| f.emissions_reduction),
            emissions_reduction_percent: figures.and_then(|f| f.emissions_reduction_percent),
            objective: figures.map(|f| f.objective),
            learning_iterations: figures.map(|f| f.learning_iterations),
            converged: figures.map(|f| f.converged),
        }
    }
}

/// Represents a row in the learning iterations CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct LearningIterationRow {
    scenario: String,
    iteration: u32,
    objective: f64,
    capacity_change: Option<f64>,
}

/// Represents a row in the energy prices CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct EnergyPriceRow {
    scenario: String,
    year: u32,
    price: MoneyPerEnergy,
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    learning_iterations_writer: csv::Writer<File>,
    energy_prices_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            learning_iterations_writer: new_writer(LEARNING_ITERATIONS_FILE_NAME)?,
            energy_prices_writer: new_writer(ENERGY_PRICES_FILE_NAME)?,
        })
    }

    /// Write all debug info for a scenario to output files
    fn write_debug_info(&mut self, scenario: &Scenario, result: &ScenarioResult) -> Result<()> {
        self.write_learning_iterations(scenario, &result.iterations)?;
        self.write_energy_prices(scenario, &result.energy_prices)?;
        Ok(())
    }

    /// Write the progress of each learning-curve pass to file
    fn write_learning_iterations(
        &mut self,
        scenario: &Scenario,
        iterations: &[IterationRecord],
    ) -> Result<()> {
        for record in iterations {
            let row = LearningIterationRow {
                scenario: scenario.to_string(),
                iteration: record.iteration,
                objective: record.objective,
                capacity_change: record.capacity_change,
            };
            self.learning_iterations_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write energy prices to file
    fn write_energy_prices(
        &mut self,
        scenario: &Scenario,
        prices: &[(u32, MoneyPerEnergy)],
    ) -> Result<()> {
        for &(year, price) in prices {
            let row = EnergyPriceRow {
                scenario: scenario.to_string(),
                year,
                price,
            };
            self.energy_prices_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.learning_iterations_writer.flush()?;
        self.energy_prices_writer.flush()?;

        Ok(())
    }
}

/// An object for writing scenario results to file
pub struct DataWriter {
    yearly_writer: csv::Writer<File>,
    technology_writer: csv::Writer<File>,
    comparison_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            yearly_writer: new_writer(YEARLY_RESULTS_FILE_NAME)?,
            technology_writer: new_writer(TECHNOLOGY_RESULTS_FILE_NAME)?,
            comparison_writer: new_writer(SCENARIO_COMPARISON_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write the yearly and per-technology results for a solved scenario
    pub fn write_scenario(&mut self, scenario: &Scenario, result: &ScenarioResult) -> Result<()> {
        for record in &result.years {
            self.yearly_writer
                .serialize(YearlyResultRow::new(scenario, record))?;
        }
        for record in &result.capacity {
            self.technology_writer
                .serialize(TechnologyResultRow::new(scenario, record))?;
        }
        if let Some(wtr) = &mut self.debug_writer {
            wtr.write_debug_info(scenario, result)?;
        }

        Ok(())
    }

    /// Write the comparison table, one row per scenario in matrix order
    pub fn write_comparison(&mut self, comparison: &ComparisonTable) -> Result<()> {
        for row in comparison.iter() {
            self.comparison_writer
                .serialize(ScenarioComparisonRow::new(row))?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.yearly_writer.flush()?;
        self.technology_writer.flush()?;
        self.comparison_writer.flush()?;
        if let Some(wtr) = &mut self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
