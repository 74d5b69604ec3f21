//! Least-cost electricity capacity expansion pathways for a matrix of renewable-energy targets and
//! demand-growth paths.
//!
//! Each scenario is turned into a year-by-year pathway of demand, reliability requirements and
//! renewable targets. A linear program then chooses when to build, retire and dispatch each
//! technology at least discounted cost. The solved scenarios are compared on investment,
//! emissions and renewable share.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod accounting;
pub mod cli;
pub mod comparison;
pub mod demand;
pub mod error;
pub mod expansion;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod pathway;
pub mod reliability;
pub mod renewable;
pub mod scenario;
pub mod settings;
pub mod simulation;
pub mod technology;
pub mod units;
pub mod year;
pub mod zone;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// This is a subfolder of the user's standard config folder, falling back to the working
/// directory if there isn't one.
pub fn get_powerpath_config_dir() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_default();
    dir.push("powerpath");
    dir
}
