//! Common routines for handling input data.
use crate::error::SchemaError;
use crate::model::{Model, ModelParameters};
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

pub mod demand;
use demand::read_demand;
pub mod scenario;
use scenario::read_scenarios;
pub mod technology;
use technology::read_technologies;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file which may not be present.
///
/// # Returns
///
/// `None` if the file does not exist, otherwise the (possibly empty) rows of the file.
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<Option<Vec<T>>> {
    if !file_path.exists() {
        return Ok(None);
    }

    read_csv_internal(file_path).map(Some)
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a [`Dimensionless`] value, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<Dimensionless, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(Dimensionless(value))
}

/// Check that the elements of a slice are unique
pub fn is_unique<T: Eq + std::hash::Hash>(items: &[T]) -> bool {
    items.iter().all_unique()
}

/// Read a model from the specified directory.
///
/// Any problem with the input files is reported as a [`SchemaError`].
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The loaded and validated model.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    read_model(model_dir).with_context(|| {
        SchemaError::new(format!("Invalid model in {}", model_dir.display()))
    })
}

fn read_model(model_dir: &Path) -> Result<Model> {
    let parameters = ModelParameters::from_path(model_dir)?;
    let technologies = read_technologies(model_dir, &parameters.zone_ids())?;
    let demand = read_demand(model_dir, parameters.units.energy)?;
    let scenarios = read_scenarios(model_dir, &demand)?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        technologies,
        demand,
        scenarios,
    })
}
