//! General functions related to finance.
use crate::units::{Capacity, Dimensionless, MoneyPerCapacity};

/// Calculates the factor by which a cost incurred after `years_elapsed` years is discounted.
pub fn discount_factor(discount_rate: Dimensionless, years_elapsed: u32) -> Dimensionless {
    let years = i32::try_from(years_elapsed).unwrap_or(i32::MAX);
    Dimensionless(1.0) / (Dimensionless(1.0) + discount_rate).powi(years)
}

/// Calculates the unit investment cost of a technology after some deployment.
///
/// The cost follows a learning curve, falling by a fixed exponent of cumulative deployment:
///
/// ```text
/// UnitCost = InitialCost * (Cumulative / Reference) ^ (-LearningRate)
/// ```
///
/// Deployment below the reference leaves the cost unchanged, as does a zero learning rate.
pub fn learning_curve_unit_cost(
    initial_cost: MoneyPerCapacity,
    learning_rate: Dimensionless,
    cumulative_capacity: Capacity,
    reference_capacity: Capacity,
) -> MoneyPerCapacity {
    if learning_rate == Dimensionless(0.0) || reference_capacity <= Capacity(0.0) {
        return initial_cost;
    }

    let ratio = (cumulative_capacity / reference_capacity).max(Dimensionless(1.0));
    initial_cost * ratio.powf(-learning_rate.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.1, 0, 1.0)] // Base year is not discounted
    #[case(0.0, 10, 1.0)] // Edge case: discount_rate==0
    #[case(0.1, 1, 0.9090909090909091)]
    #[case(0.07, 10, 0.5083492921347176)]
    #[case(0.1, 36, 0.03234918430760664)]
    fn test_discount_factor(
        #[case] discount_rate: f64,
        #[case] years_elapsed: u32,
        #[case] expected: f64,
    ) {
        let result = discount_factor(Dimensionless(discount_rate), years_elapsed);
        assert_approx_eq!(f64, result.0, expected, epsilon = 1e-8);
    }

    #[rstest]
    #[case(800.0, 0.2, 100.0, 100.0, 800.0)] // No deployment beyond reference
    #[case(800.0, 0.2, 50.0, 100.0, 800.0)] // Below reference: cost unchanged
    #[case(800.0, 0.0, 1000.0, 100.0, 800.0)] // No learning
    #[case(800.0, 0.2, 200.0, 100.0, 696.4404506368993)] // Doubling: 800 * 2^-0.2
    #[case(800.0, 0.5, 400.0, 100.0, 400.0)]
    #[case(800.0, 0.2, 200.0, 0.0, 800.0)] // No reference: cost unchanged
    fn test_learning_curve_unit_cost(
        #[case] initial_cost: f64,
        #[case] learning_rate: f64,
        #[case] cumulative: f64,
        #[case] reference: f64,
        #[case] expected: f64,
    ) {
        let result = learning_curve_unit_cost(
            MoneyPerCapacity(initial_cost),
            Dimensionless(learning_rate),
            Capacity(cumulative),
            Capacity(reference),
        );
        assert_approx_eq!(
            MoneyPerCapacity,
            result,
            MoneyPerCapacity(expected),
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_learning_curve_is_monotonic() {
        let costs = [100.0, 150.0, 300.0, 1000.0].map(|cumulative| {
            learning_curve_unit_cost(
                MoneyPerCapacity(1.0),
                Dimensionless(0.15),
                Capacity(cumulative),
                Capacity(100.0),
            )
        });
        assert!(costs.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
