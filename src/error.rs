//! Error kinds which decide how a failure is reported.
//!
//! Errors are passed around as [`anyhow::Error`]s. The kinds defined here sit at the root of the
//! error chain, so the caller can recover them with [`anyhow::Error::downcast_ref`] whatever
//! context has been added on top.
use serde_string_enum::SerializeLabeledStringEnum;
use std::fmt;

/// An input value which is out of range for a single scenario.
///
/// This is fatal to the construction of the affected scenario only.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
#[display("{_0}")]
pub struct ParameterError(String);

impl ParameterError {
    /// Create a new [`ParameterError`] with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::error::Error for ParameterError {}

/// Malformed model input (catalog, demand file, parameters or scenario matrix).
///
/// This is fatal to the whole run.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
#[display("{_0}")]
pub struct SchemaError(String);

impl SchemaError {
    /// Create a new [`SchemaError`] with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::error::Error for SchemaError {}

/// Bail out of a scenario's construction with a [`ParameterError`] if the condition is false
macro_rules! ensure_param {
    ($cond:expr, $($arg:tt)+) => {
        anyhow::ensure!($cond, $crate::error::ParameterError::new(format!($($arg)+)))
    };
}
pub(crate) use ensure_param;

/// The reason why a scenario has no result
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum)]
pub enum FailureKind {
    /// An input was out of range for this scenario
    #[string = "parameter_error"]
    Parameter,
    /// The constraints cannot be satisfied together
    #[string = "infeasible"]
    Infeasible,
    /// The objective can be decreased without limit
    #[string = "unbounded"]
    Unbounded,
    /// The solver failed or ran out of time
    #[string = "solver_error"]
    Solver,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Parameter => "parameter error",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Solver => "solver error",
        };
        write!(f, "{label}")
    }
}

/// A failed scenario along with a human-readable explanation
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFailure {
    /// What went wrong
    pub kind: FailureKind,
    /// Why it went wrong
    pub diagnostic: String,
}

impl ScenarioFailure {
    /// Create a new [`ScenarioFailure`]
    pub fn new(kind: FailureKind, diagnostic: impl Into<String>) -> Self {
        Self {
            kind,
            diagnostic: diagnostic.into(),
        }
    }

    /// Classify an error raised while constructing a scenario.
    ///
    /// Anything which is not a [`ParameterError`] is treated as a solver failure.
    pub fn from_construction_error(err: &anyhow::Error) -> Self {
        let kind = if err.downcast_ref::<ParameterError>().is_some() {
            FailureKind::Parameter
        } else {
            FailureKind::Solver
        };

        Self::new(kind, format!("{err:#}"))
    }
}

impl fmt::Display for ScenarioFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    fn check_growth(rate: f64) -> Result<()> {
        ensure_param!(rate > 0.0, "Growth rate must be positive, got {rate}");
        Ok(())
    }

    #[test]
    fn test_ensure_param() {
        assert!(check_growth(0.05).is_ok());

        let err = check_growth(-0.01).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ParameterError>(),
            Some(&ParameterError::new("Growth rate must be positive, got -0.01"))
        );
    }

    #[test]
    fn test_failure_from_construction_error() {
        let err = check_growth(0.0)
            .context("Invalid demand path LEG")
            .unwrap_err();
        let failure = ScenarioFailure::from_construction_error(&err);
        assert_eq!(failure.kind, FailureKind::Parameter);
        assert_eq!(
            failure.diagnostic,
            "Invalid demand path LEG: Growth rate must be positive, got 0"
        );

        let err = anyhow::anyhow!("Something else");
        assert_eq!(
            ScenarioFailure::from_construction_error(&err).kind,
            FailureKind::Solver
        );
    }
}
