//! Policy scenarios: combinations of a renewable target and a demand path.
use crate::units::Dimensionless;
use itertools::Itertools;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::fmt;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// The renewable share of generation to be reached by the final year
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    IntoStaticStr,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
)]
pub enum RenewableTarget {
    /// 30% renewable generation
    #[string = "REN30"]
    #[strum(serialize = "REN30")]
    Ren30,
    /// 50% renewable generation
    #[string = "REN50"]
    #[strum(serialize = "REN50")]
    Ren50,
    /// 60% renewable generation
    #[string = "REN60"]
    #[strum(serialize = "REN60")]
    Ren60,
    /// 70% renewable generation
    #[string = "REN70"]
    #[strum(serialize = "REN70")]
    Ren70,
}

impl RenewableTarget {
    /// The target share as a proportion
    pub fn share(self) -> Dimensionless {
        match self {
            Self::Ren30 => Dimensionless(0.3),
            Self::Ren50 => Dimensionless(0.5),
            Self::Ren60 => Dimensionless(0.6),
            Self::Ren70 => Dimensionless(0.7),
        }
    }
}

/// A demand-growth trajectory
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    IntoStaticStr,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
)]
pub enum DemandPath {
    /// Low economic growth
    #[string = "LEG"]
    #[strum(serialize = "LEG")]
    Low,
    /// Business as usual
    #[string = "BAU"]
    #[strum(serialize = "BAU")]
    BusinessAsUsual,
    /// Medium economic growth
    #[string = "MEG"]
    #[strum(serialize = "MEG")]
    Medium,
    /// High economic growth
    #[string = "HEG"]
    #[strum(serialize = "HEG")]
    High,
}

macro_rules! impl_label_display {
    ($t:ty) => {
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let label: &'static str = self.into();
                write!(f, "{label}")
            }
        }
    };
}
impl_label_display!(RenewableTarget);
impl_label_display!(DemandPath);

/// A single policy scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scenario {
    /// The renewable target
    pub renewable_target: RenewableTarget,
    /// The demand path
    pub demand_path: DemandPath,
}

impl Scenario {
    /// Create a new [`Scenario`]
    pub fn new(renewable_target: RenewableTarget, demand_path: DemandPath) -> Self {
        Self {
            renewable_target,
            demand_path,
        }
    }

    /// Every combination of renewable target and demand path.
    ///
    /// Ordered by renewable target, then demand path.
    pub fn full_matrix() -> Vec<Scenario> {
        RenewableTarget::iter()
            .cartesian_product(DemandPath::iter())
            .map(|(target, path)| Scenario::new(target, path))
            .collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.renewable_target, self.demand_path)
    }
}
