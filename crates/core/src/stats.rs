//! Numeric primitives shared by the analytics engines.
//!
//! All fits run over implicit index positions `0..n-1`, matching how the
//! consumption history is ordered (oldest record first). Degenerate inputs
//! fall back to the highest-degree fit the data supports rather than
//! producing NaN.

use thiserror::Error;

/// Statistics over an empty series are a caller error, signalled rather
/// than silently mapped to 0 or NaN.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("statistic requires a non-empty series")]
pub struct EmptySeries;

pub fn mean(values: &[f64]) -> Result<f64, EmptySeries> {
    if values.is_empty() {
        return Err(EmptySeries);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Result<f64, EmptySeries> {
    if values.is_empty() {
        return Err(EmptySeries);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Result<f64, EmptySeries> {
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg) * (v - avg)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Slope of the degree-1 least-squares fit over index positions.
///
/// A single-point series has no defined slope; it is reported as 0.0.
pub fn linear_slope(values: &[f64]) -> Result<f64, EmptySeries> {
    if values.is_empty() {
        return Err(EmptySeries);
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values)?;

    let mut covariance = 0.0;
    let mut x_variance = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        covariance += dx * (y - y_mean);
        x_variance += dx * dx;
    }

    if x_variance <= f64::EPSILON {
        return Ok(0.0);
    }
    Ok(covariance / x_variance)
}

/// Coefficients `[a, b, c]` of the degree-2 least-squares fit, with
/// `f(x) = a*x^2 + b*x + c` over index positions.
///
/// Series too short for a quadratic (or with a singular normal system)
/// degrade to the linear fit `[0, slope, intercept]`.
pub fn quadratic_fit(values: &[f64]) -> Result<[f64; 3], EmptySeries> {
    if values.is_empty() {
        return Err(EmptySeries);
    }
    if values.len() < 3 {
        return linear_fallback(values);
    }

    // Normal equations for the quadratic: sums of x^k and x^k * y.
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut t0, mut t1, mut t2) = (0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        let x2 = x * x;
        s1 += x;
        s2 += x2;
        s3 += x2 * x;
        s4 += x2 * x2;
        t0 += y;
        t1 += x * y;
        t2 += x2 * y;
    }
    let s0 = values.len() as f64;

    let det = det3(s4, s3, s2, s3, s2, s1, s2, s1, s0);
    if det.abs() <= f64::EPSILON {
        return linear_fallback(values);
    }

    let a = det3(t2, s3, s2, t1, s2, s1, t0, s1, s0) / det;
    let b = det3(s4, t2, s2, s3, t1, s1, s2, t0, s0) / det;
    let c = det3(s4, s3, t2, s3, s2, t1, s2, s1, t0) / det;
    Ok([a, b, c])
}

/// Evaluate a polynomial given highest-degree-first coefficients (Horner).
pub fn evaluate_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, c| acc * x + c)
}

fn linear_fallback(values: &[f64]) -> Result<[f64; 3], EmptySeries> {
    let slope = linear_slope(values)?;
    let y_mean = mean(values)?;
    let x_mean = (values.len() as f64 - 1.0) / 2.0;
    Ok([0.0, slope, y_mean - slope * x_mean])
}

#[allow(clippy::too_many_arguments)]
fn det3(
    m00: f64,
    m01: f64,
    m02: f64,
    m10: f64,
    m11: f64,
    m12: f64,
    m20: f64,
    m21: f64,
    m22: f64,
) -> f64 {
    m00 * (m11 * m22 - m12 * m21) - m01 * (m10 * m22 - m12 * m20) + m02 * (m10 * m21 - m11 * m20)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn mean_and_median_of_odd_series() {
        let series = [3.0, 1.0, 2.0];
        assert!(approx(mean(&series).unwrap(), 2.0));
        assert!(approx(median(&series).unwrap(), 2.0));
    }

    #[test]
    fn median_of_even_series_averages_middle_pair() {
        assert!(approx(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5));
    }

    #[test]
    fn std_dev_is_population_not_sample() {
        // Variance of [2, 4] around mean 3 is 1, not 2.
        assert!(approx(std_dev(&[2.0, 4.0]).unwrap(), 1.0));
    }

    #[test]
    fn empty_series_is_signalled() {
        assert_eq!(mean(&[]), Err(EmptySeries));
        assert_eq!(median(&[]), Err(EmptySeries));
        assert_eq!(std_dev(&[]), Err(EmptySeries));
        assert_eq!(linear_slope(&[]), Err(EmptySeries));
        assert_eq!(quadratic_fit(&[]), Err(EmptySeries));
    }

    #[test]
    fn linear_slope_recovers_exact_line() {
        // y = 2x + 1 over indices 0..4
        let series = [1.0, 3.0, 5.0, 7.0, 9.0];
        assert!(approx(linear_slope(&series).unwrap(), 2.0));
    }

    #[test]
    fn linear_slope_of_constant_series_is_zero() {
        assert!(approx(linear_slope(&[5.0, 5.0, 5.0, 5.0]).unwrap(), 0.0));
    }

    #[test]
    fn single_point_slope_is_defined_as_zero() {
        assert!(approx(linear_slope(&[42.0]).unwrap(), 0.0));
    }

    #[test]
    fn quadratic_fit_recovers_exact_parabola() {
        // y = x^2 - 2x + 3 over indices 0..4
        let series: Vec<f64> = (0..5).map(|x| (x * x) as f64 - 2.0 * x as f64 + 3.0).collect();
        let [a, b, c] = quadratic_fit(&series).unwrap();
        assert!(approx(a, 1.0));
        assert!(approx(b, -2.0));
        assert!(approx(c, 3.0));
    }

    #[test]
    fn quadratic_fit_of_constant_series_is_flat() {
        let [a, b, c] = quadratic_fit(&[7.0, 7.0, 7.0, 7.0]).unwrap();
        assert!(approx(a, 0.0));
        assert!(approx(b, 0.0));
        assert!(approx(c, 7.0));
    }

    #[test]
    fn two_point_series_degrades_to_linear_fit() {
        let [a, b, c] = quadratic_fit(&[1.0, 3.0]).unwrap();
        assert!(approx(a, 0.0));
        assert!(approx(b, 2.0));
        assert!(approx(c, 1.0));
    }

    #[test]
    fn polynomial_evaluation_is_highest_degree_first() {
        // 2x^2 + 3x + 4 at x = 2 -> 18
        assert!(approx(evaluate_polynomial(&[2.0, 3.0, 4.0], 2.0), 18.0));
        assert!(approx(evaluate_polynomial(&[], 5.0), 0.0));
    }
}
