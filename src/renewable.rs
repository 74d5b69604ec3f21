//! The renewable trajectory gives the target renewable share of generation in each year.
use crate::error::ensure_param;
use crate::units::Dimensionless;
use crate::year::Horizon;
use anyhow::Result;

/// A straight-line path from the base-year renewable share to a scenario's target share
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenewableTrajectory {
    base_share: Dimensionless,
    target_share: Dimensionless,
    start_year: u32,
    end_year: u32,
}

impl RenewableTrajectory {
    /// Create a new [`RenewableTrajectory`] over the given horizon.
    ///
    /// Both shares must be proportions and the target cannot be below the base share.
    pub fn new(
        base_share: Dimensionless,
        target_share: Dimensionless,
        horizon: &Horizon,
    ) -> Result<Self> {
        for (name, share) in [("Base", base_share), ("Target", target_share)] {
            ensure_param!(
                share >= Dimensionless(0.0) && share <= Dimensionless(1.0),
                "{name} renewable share must be between 0 and 1, got {share}"
            );
        }
        ensure_param!(
            target_share >= base_share,
            "Renewable target ({target_share}) is below the base-year renewable share \
            ({base_share})"
        );
        ensure_param!(
            horizon.length() > 0,
            "Horizon length must be greater than zero"
        );

        Ok(Self {
            base_share,
            target_share,
            start_year: horizon.base_year(),
            end_year: horizon.final_year(),
        })
    }

    /// The target share for the given year.
    ///
    /// Clamped to the base share before the start of the horizon and to the target share after
    /// its end.
    pub fn share_at(&self, year: u32) -> Dimensionless {
        if year <= self.start_year {
            return self.base_share;
        }
        if year >= self.end_year {
            return self.target_share;
        }

        let fraction =
            f64::from(year - self.start_year) / f64::from(self.end_year - self.start_year);
        self.base_share + (self.target_share - self.base_share) * Dimensionless(fraction)
    }

    /// The share reached in the final year
    pub fn target_share(&self) -> Dimensionless {
        self.target_share
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParameterError;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 0.25)] // Before the horizon
    #[case(2014, 0.25)]
    #[case(2032, 0.275)]
    #[case(2050, 0.30)]
    #[case(2060, 0.30)] // After the horizon
    fn test_share_at(#[case] year: u32, #[case] expected: f64) {
        let trajectory = RenewableTrajectory::new(
            Dimensionless(0.25),
            Dimensionless(0.30),
            &Horizon::new(2014, 36),
        )
        .unwrap();
        assert_approx_eq!(f64, trajectory.share_at(year).value(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_target_equal_to_base() {
        let trajectory = RenewableTrajectory::new(
            Dimensionless(0.3),
            Dimensionless(0.3),
            &Horizon::new(2014, 36),
        )
        .unwrap();
        assert_eq!(trajectory.share_at(2030), Dimensionless(0.3));
    }

    #[rstest]
    #[case(0.35, 0.30)] // Target below base
    #[case(-0.1, 0.30)]
    #[case(0.1, 1.1)]
    fn test_bad_shares(#[case] base: f64, #[case] target: f64) {
        let result = RenewableTrajectory::new(
            Dimensionless(base),
            Dimensionless(target),
            &Horizon::new(2014, 36),
        );
        assert!(result.unwrap_err().downcast_ref::<ParameterError>().is_some());
    }
}
