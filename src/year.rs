//! Code for working with years and year-dependent parameters.
use serde::Deserialize;

/// The years covered by a model: the base year plus a number of following years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    base_year: u32,
    length: u32,
}

impl Horizon {
    /// Create a new [`Horizon`]
    pub fn new(base_year: u32, length: u32) -> Self {
        Self { base_year, length }
    }

    /// The first (historical) year
    pub fn base_year(&self) -> u32 {
        self.base_year
    }

    /// The last year modelled
    pub fn final_year(&self) -> u32 {
        self.base_year + self.length
    }

    /// Number of years after the base year
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Number of years in the horizon, including the base year
    pub fn num_years(&self) -> usize {
        self.length as usize + 1
    }

    /// Iterate over every year in the horizon, in order
    pub fn iter_years(&self) -> impl Iterator<Item = u32> + use<> {
        self.base_year..=self.final_year()
    }

    /// Years elapsed between the base year and `year`
    pub fn years_elapsed(&self, year: u32) -> u32 {
        year.saturating_sub(self.base_year)
    }

    /// The elapsed fraction of the horizon at `year`.
    ///
    /// Years outside the horizon give values outside `[0, 1]`.
    pub fn elapsed_fraction(&self, year: u32) -> f64 {
        (f64::from(year) - f64::from(self.base_year)) / f64::from(self.length)
    }
}

/// A parameter which changes linearly from an initial value in the base year to a final value in
/// the last year.
///
/// Written in TOML as `{ initial = 0.2, final = 0.12 }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LinearPath {
    /// Value in the base year
    pub initial: f64,
    /// Value in the final year
    #[serde(rename = "final")]
    pub end: f64,
}

impl LinearPath {
    /// Create a new [`LinearPath`]
    pub fn new(initial: f64, end: f64) -> Self {
        Self { initial, end }
    }

    /// The value after the given fraction of the horizon has elapsed
    pub fn value_at(&self, elapsed_fraction: f64) -> f64 {
        self.initial + (self.end - self.initial) * elapsed_fraction
    }

    /// Whether both ends are finite and satisfy the predicate
    pub fn all(&self, predicate: impl Fn(f64) -> bool) -> bool {
        [self.initial, self.end]
            .into_iter()
            .all(|value| value.is_finite() && predicate(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_horizon() {
        let horizon = Horizon::new(2014, 36);
        assert_eq!(horizon.final_year(), 2050);
        assert_eq!(horizon.num_years(), 37);
        assert_eq!(horizon.iter_years().count(), 37);
        assert_eq!(horizon.iter_years().next(), Some(2014));
        assert_eq!(horizon.iter_years().last(), Some(2050));
        assert_eq!(horizon.years_elapsed(2032), 18);
        assert_eq!(horizon.elapsed_fraction(2032), 0.5);
        assert_eq!(horizon.elapsed_fraction(2014), 0.0);
        assert_eq!(horizon.elapsed_fraction(2050), 1.0);
    }

    #[rstest]
    #[case(0.0, 0.20)]
    #[case(0.5, 0.16)]
    #[case(1.0, 0.12)]
    fn test_linear_path_decreasing(#[case] fraction: f64, #[case] expected: f64) {
        let path = LinearPath::new(0.20, 0.12);
        assert_approx_eq!(f64, path.value_at(fraction), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_path_non_monotonic_inputs() {
        // An increasing path is just as valid as a decreasing one
        let path = LinearPath::new(0.04, 0.08);
        assert_approx_eq!(f64, path.value_at(0.25), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_path_from_toml() {
        let path: LinearPath = toml::from_str("initial = 0.08\nfinal = 0.04").unwrap();
        assert_eq!(path, LinearPath::new(0.08, 0.04));
        assert!(path.all(|value| value >= 0.0));
        assert!(!LinearPath::new(f64::NAN, 0.0).all(|_| true));
    }
}
