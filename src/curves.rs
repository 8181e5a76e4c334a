//! Continuous scoring curves.
//!
//! Every curve maps a measured value to a score in `[0, max_score]`. They are
//! total: any real input, including NaN, produces a finite, non-negative score
//! for a finite, non-negative `max_score`.

/// Decay constant of [`gaussian_score`].
pub const GAUSSIAN_DECAY: f64 = 0.3;

/// Decay constant of [`range_gaussian_score`]; a deviation of one half-range keeps ~78% of the score.
pub const RANGE_DECAY: f64 = 0.25;

/// Bell curve centred on `ideal`, equal to `max_score` there.
pub fn gaussian_score(value: f64, ideal: f64, tolerance: f64, max_score: f64) -> f64 {
    let deviation = (value - ideal) / tolerance;
    (max_score * (-GAUSSIAN_DECAY * deviation.powi(2)).exp()).max(0.0)
}

/// Logistic curve, `max_score / 2` at `threshold` and increasing in `value`.
pub fn sigmoid_score(value: f64, threshold: f64, steepness: f64, max_score: f64) -> f64 {
    let normalized = (1.0 + (-steepness * (value - threshold)).exp()).recip();
    (normalized * max_score).max(0.0)
}

/// Full marks anywhere inside `[min, max]`, gaussian fall-off outside.
///
/// The deviation is measured from the nearest bound and normalized by half the
/// range width. A zero-width range falls back to a unit half-width.
pub fn range_gaussian_score(value: f64, min: f64, max: f64, max_score: f64) -> f64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    if (min..=max).contains(&value) {
        return max_score;
    }

    let half_width = (max - min) / 2.0;
    let tolerance = if half_width > 0.0 { half_width } else { 1.0 };
    let distance = if value < min { min - value } else { value - max };
    let deviation = distance / tolerance;

    // NaN falls through to here and is floored away
    (max_score * (-RANGE_DECAY * deviation.powi(2)).exp()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    mod gaussian_tests {
        use super::*;

        #[test]
        fn exact_at_ideal() {
            for &(ideal, tolerance, max_score) in &[(0.0, 1.0, 10.0), (0.8, 0.3, 25.0), (-3.5, 1e-6, 0.0)] {
                assert_eq!(gaussian_score(ideal, ideal, tolerance, max_score), max_score);
            }
        }

        #[test]
        fn decreases_with_deviation() {
            let near = gaussian_score(0.9, 0.8, 0.3, 25.0);
            let far = gaussian_score(1.2, 0.8, 0.3, 25.0);
            let symmetric = gaussian_score(0.7, 0.8, 0.3, 25.0);
            assert!(near > far);
            assert_approx_eq!(near, symmetric);
        }

        #[test]
        fn one_tolerance_away() {
            assert_approx_eq!(gaussian_score(1.0, 0.0, 1.0, 10.0), 10.0 * (-0.3_f64).exp());
        }

        #[test]
        fn vanishes_far_away() {
            assert!(gaussian_score(1e3, 0.0, 1.0, 10.0) < 1e-12);
        }
    }

    mod sigmoid_tests {
        use super::*;

        #[test]
        fn half_at_threshold() {
            assert_approx_eq!(sigmoid_score(0.5, 0.5, 10.0, 10.0), 5.0);
        }

        #[test]
        fn monotone() {
            let low = sigmoid_score(0.3, 0.5, 10.0, 10.0);
            let high = sigmoid_score(0.9, 0.5, 10.0, 10.0);
            assert!(low < high);
            assert_approx_eq!(high, 10.0 / (1.0 + (-4.0_f64).exp()));
        }

        #[test]
        fn saturates() {
            assert_approx_eq!(sigmoid_score(100.0, 0.0, 20.0, 7.0), 7.0);
            assert_approx_eq!(sigmoid_score(-100.0, 0.0, 20.0, 7.0), 0.0);
        }
    }

    mod range_gaussian_tests {
        use super::*;

        #[test]
        fn full_marks_on_range() {
            for value in [140.0, 150.0, 162.5, 175.0].iter() {
                assert_eq!(range_gaussian_score(*value, 140.0, 175.0, 12.8), 12.8);
            }
        }

        #[test]
        fn strictly_decreasing_off_range() {
            let mut previous = range_gaussian_score(175.0, 140.0, 175.0, 10.0);
            for step in 1..50 {
                let current = range_gaussian_score(175.0 + f64::from(step), 140.0, 175.0, 10.0);
                assert!(current < previous);
                assert!(current >= 0.0);
                previous = current;
            }

            let mut previous = range_gaussian_score(140.0, 140.0, 175.0, 10.0);
            for step in 1..50 {
                let current = range_gaussian_score(140.0 - f64::from(step), 140.0, 175.0, 10.0);
                assert!(current < previous);
                previous = current;
            }
        }

        #[test]
        fn half_range_keeps_most_of_the_score() {
            // half-range of (80, 110) is 15
            assert_approx_eq!(range_gaussian_score(125.0, 80.0, 110.0, 100.0), 100.0 * (-0.25_f64).exp());
            assert!(range_gaussian_score(65.0, 80.0, 110.0, 100.0) > 77.0);
        }

        #[test]
        fn never_negative() {
            assert_eq!(range_gaussian_score(f64::NAN, 0.0, 1.0, 5.0), 0.0);
            assert!(range_gaussian_score(-1e9, 0.0, 1.0, 5.0) >= 0.0);
        }

        #[test]
        fn degenerate_and_reversed_ranges() {
            assert_eq!(range_gaussian_score(3.0, 3.0, 3.0, 4.0), 4.0);
            assert_approx_eq!(range_gaussian_score(4.0, 3.0, 3.0, 4.0), 4.0 * (-0.25_f64).exp());
            assert_eq!(range_gaussian_score(0.5, 1.0, 0.0, 2.0), 2.0);
        }
    }
}
