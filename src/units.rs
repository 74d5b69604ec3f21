//! This module defines the quantity types used throughout the model and the unit system in which
//! their values are expressed.
//!
//! All values in a model share one unit system, declared in `model.toml`. Capacity is always one
//! thousandth of the energy unit per hour (MW with GWh, GW with TWh), so converting between
//! capacity and energy only needs the number of hours.
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::iter::Sum;

/// Number of capacity-unit-hours in one energy unit (e.g. MWh per GWh)
const CAPACITY_HOURS_PER_ENERGY_UNIT: f64 = 1000.0;

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::Display,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub const fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is neither infinite nor NaN
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// The larger of two values
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// The smaller of two values
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self(0.0), |acc, x| acc + x)
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                float_cmp::ApproxEq::approx_eq(self.0, other.0, margin)
            }
        }
    };
}

macro_rules! impl_scale {
    ($name:ident) => {
        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

unit_struct!(Dimensionless);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Raise to a floating-point power
    pub fn powf(self, rhs: f64) -> Self {
        Dimensionless(self.0.powf(rhs))
    }

    /// Raise to an integer power
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless(self.0.powi(rhs))
    }
}

// Base quantities
unit_struct!(Money);
unit_struct!(Energy);
unit_struct!(Capacity);
unit_struct!(Emissions);

// Derived quantities
unit_struct!(MoneyPerCapacity);
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerEmissions);
unit_struct!(EmissionsPerEnergy);

impl_scale!(Money);
impl_scale!(Energy);
impl_scale!(Capacity);
impl_scale!(Emissions);
impl_scale!(MoneyPerCapacity);
impl_scale!(MoneyPerEnergy);

// Multiplication rules
impl_mul!(MoneyPerCapacity, Capacity, Money);
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(MoneyPerEmissions, Emissions, Money);
impl_mul!(EmissionsPerEnergy, Energy, Emissions);
impl_mul!(MoneyPerEmissions, EmissionsPerEnergy, MoneyPerEnergy);

impl Capacity {
    /// The energy produced by running at this capacity for the given number of hours
    pub fn energy_over(self, hours: f64) -> Energy {
        Energy(self.0 * hours / CAPACITY_HOURS_PER_ENERGY_UNIT)
    }
}

impl Energy {
    /// The constant capacity which would deliver this energy over the given number of hours
    pub fn average_capacity(self, hours: f64) -> Capacity {
        Capacity(self.0 * CAPACITY_HOURS_PER_ENERGY_UNIT / hours)
    }
}

/// The unit in which energy (and, by extension, capacity) is expressed
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
)]
pub enum EnergyUnit {
    /// Gigawatt-hours, with capacity in megawatts
    #[default]
    #[string = "GWh"]
    GigawattHours,
    /// Terawatt-hours, with capacity in gigawatts
    #[string = "TWh"]
    TerawattHours,
}

impl EnergyUnit {
    /// Label for energy values
    pub fn energy_label(self) -> &'static str {
        match self {
            Self::GigawattHours => "GWh",
            Self::TerawattHours => "TWh",
        }
    }

    /// Label for capacity values
    pub fn capacity_label(self) -> &'static str {
        match self {
            Self::GigawattHours => "MW",
            Self::TerawattHours => "GW",
        }
    }
}

/// The scale in which monetary values are expressed
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
)]
pub enum MoneyUnit {
    /// Millions of the model currency
    #[default]
    #[string = "million"]
    Million,
    /// Billions of the model currency
    #[string = "billion"]
    Billion,
}

/// The unit system shared by every value in a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct UnitSystem {
    /// Unit for energy quantities
    #[serde(default)]
    pub energy: EnergyUnit,
    /// Scale for monetary quantities
    #[serde(default)]
    pub money: MoneyUnit,
}
