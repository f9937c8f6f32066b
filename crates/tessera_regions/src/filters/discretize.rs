//! Zero-order-hold discretization of continuous transfer functions.
//!
//! The transfer function is realized in controllable canonical form, the
//! augmented matrix `[[A, B], [0, 0]]·dt` is exponentiated to obtain the
//! discrete `(Ad, Bd)`, and the discrete transfer function is read back
//! from characteristic polynomials:
//!
//! ```text
//! den_d = charpoly(Ad)
//! num_d = charpoly(Ad - Bd·C) + (D - 1)·den_d
//! ```

use crate::error::FilterError;
use ndarray::{s, Array1, Array2};

/// Number of Taylor terms used after scaling the exponent below
/// [`SCALED_NORM`].
const TAYLOR_TERMS: u32 = 20;

/// Infinity norm the exponent is scaled down to before the Taylor series.
const SCALED_NORM: f64 = 0.5;

/// Upper bound on squarings; exponents needing more overflow `f64` anyway.
const MAX_SQUARINGS: i32 = 64;

/// A discrete transfer function with `den[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteTf {
    /// Numerator coefficients, highest power of `z` first.
    pub num: Vec<f64>,
    /// Denominator coefficients, highest power of `z` first.
    pub den: Vec<f64>,
}

impl DiscreteTf {
    /// Order of the filter.
    pub fn order(&self) -> usize {
        self.den.len() - 1
    }
}

/// Discretizes `num(s)/den(s)` with a zero-order hold at timestep `dt`.
///
/// Both returned coefficient vectors have `den.len()` entries.
pub fn zoh(num: &[f64], den: &[f64], dt: f64) -> Result<DiscreteTf, FilterError> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(FilterError::InvalidTimestep(dt));
    }
    let (num, den) = normalize(num, den)?;
    let n = den.len() - 1;
    let feedthrough = num[0];

    if n == 0 {
        return Ok(DiscreteTf {
            num: vec![feedthrough],
            den: vec![1.0],
        });
    }

    // Controllable canonical realization.
    let mut a = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        a[[0, j]] = -den[j + 1];
    }
    for i in 1..n {
        a[[i, i - 1]] = 1.0;
    }
    let c: Array1<f64> = (0..n).map(|j| num[j + 1] - feedthrough * den[j + 1]).collect();

    let mut augmented = Array2::<f64>::zeros((n + 1, n + 1));
    augmented.slice_mut(s![..n, ..n]).assign(&(&a * dt));
    augmented[[0, n]] = dt;
    let exp = expm(&augmented)?;

    let ad = exp.slice(s![..n, ..n]).to_owned();
    let bd = exp.slice(s![..n, n]).to_owned();

    let den_d = charpoly(&ad);
    let bc = outer(&bd, &c);
    let num_d: Vec<f64> = charpoly(&(&ad - &bc))
        .iter()
        .zip(&den_d)
        .map(|(p, d)| p + (feedthrough - 1.0) * d)
        .collect();

    if num_d.iter().chain(&den_d).any(|v| !v.is_finite()) {
        return Err(FilterError::NonFinite);
    }
    Ok(DiscreteTf {
        num: num_d,
        den: den_d,
    })
}

/// Validates a transfer function and returns it with `den[0] == 1` and the
/// numerator left-padded to the denominator's length.
fn normalize(num: &[f64], den: &[f64]) -> Result<(Vec<f64>, Vec<f64>), FilterError> {
    let lead = *den.first().ok_or(FilterError::EmptyDenominator)?;
    if num.iter().chain(den).any(|v| !v.is_finite()) {
        return Err(FilterError::NonFinite);
    }
    if lead == 0.0 {
        return Err(FilterError::ZeroLeadingDenominator);
    }
    if num.len() > den.len() {
        return Err(FilterError::Improper {
            num: num.len(),
            den: den.len(),
        });
    }

    let mut padded = vec![0.0; den.len() - num.len()];
    padded.extend(num.iter().map(|b| b / lead));
    let den = den.iter().map(|a| a / lead).collect();
    Ok((padded, den))
}

/// Matrix exponential by scaling and squaring a truncated Taylor series.
///
/// Fails with [`FilterError::NonFinite`] when the exponent is too large for
/// the result to be representable.
fn expm(m: &Array2<f64>) -> Result<Array2<f64>, FilterError> {
    let n = m.nrows();
    let norm = m
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max);
    if !norm.is_finite() {
        return Err(FilterError::NonFinite);
    }
    let squarings = if norm > SCALED_NORM {
        let needed = (norm / SCALED_NORM).log2().ceil();
        if needed > f64::from(MAX_SQUARINGS) {
            return Err(FilterError::NonFinite);
        }
        needed as i32
    } else {
        0
    };
    let scaled = m / 2f64.powi(squarings);

    let mut term = Array2::<f64>::eye(n);
    let mut result = Array2::<f64>::eye(n);
    for k in 1..=TAYLOR_TERMS {
        term = term.dot(&scaled) / k as f64;
        result += &term;
    }
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}

/// Characteristic polynomial `det(λI - A)`, highest power first, by the
/// Faddeev–LeVerrier recurrence. The leading coefficient is exactly 1.
fn charpoly(a: &Array2<f64>) -> Vec<f64> {
    let n = a.nrows();
    let identity = Array2::<f64>::eye(n);
    let mut coeffs = vec![0.0; n + 1];
    coeffs[0] = 1.0;

    let mut m = Array2::<f64>::zeros((n, n));
    for k in 1..=n {
        m = a.dot(&m) + &identity * coeffs[k - 1];
        coeffs[k] = -a.dot(&m).diag().sum() / k as f64;
    }
    coeffs
}

fn outer(col: &Array1<f64>, row: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((col.len(), row.len()), |(i, j)| col[i] * row[j])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len(), "{a:?} vs {b:?}");
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn first_order_matches_exponential() {
        let tau = 0.01;
        let dt = 0.001;
        let tf = zoh(&[1.0], &[tau, 1.0], dt).unwrap();
        let e = (-dt / tau).exp();
        assert_eq!(tf.order(), 1);
        assert_eq!(tf.den[0], 1.0);
        assert_eq!(tf.num[0], 0.0);
        assert_close(&tf.den, &[1.0, -e]);
        assert_close(&tf.num, &[0.0, 1.0 - e]);
    }

    #[test]
    fn second_order_real_poles() {
        // 1 / ((s + 1)(s + 2)), zoh at dt = 0.1:
        // den_d = (z - e^-0.1)(z - e^-0.2)
        // num_d from partial fractions 1/(s+1) - 1/(s+2).
        let dt = 0.1;
        let tf = zoh(&[1.0], &[1.0, 3.0, 2.0], dt).unwrap();
        let (p1, p2) = ((-dt).exp(), (-2.0 * dt).exp());
        assert_close(&tf.den, &[1.0, -(p1 + p2), p1 * p2]);

        // Residues: (1 - p1)/(z - p1) - (1 - p2)/(2 (z - p2))
        let r1 = 1.0 - p1;
        let r2 = (1.0 - p2) / 2.0;
        let expected = [0.0, r1 - r2, -(r1 * p2) + r2 * p1];
        assert_close(&tf.num, &expected);
        assert_eq!(tf.num[0], 0.0);
    }

    #[test]
    fn feedthrough_survives() {
        // (s + 2)/(s + 1) = 1 + 1/(s + 1)
        let tf = zoh(&[1.0, 2.0], &[1.0, 1.0], 0.01).unwrap();
        assert!((tf.num[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pure_gain() {
        let tf = zoh(&[0.5], &[2.0], 0.001).unwrap();
        assert_eq!(tf.order(), 0);
        assert_eq!(tf.num, vec![0.25]);
        assert_eq!(tf.den, vec![1.0]);
    }

    #[test]
    fn large_step_uses_squaring() {
        let tf = zoh(&[1.0], &[0.001, 1.0], 1.0).unwrap();
        // e^-1000 underflows to zero
        assert_close(&tf.den, &[1.0, 0.0]);
        assert_close(&tf.num, &[0.0, 1.0]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(zoh(&[1.0], &[], 0.1), Err(FilterError::EmptyDenominator));
        assert_eq!(
            zoh(&[1.0], &[0.0, 1.0], 0.1),
            Err(FilterError::ZeroLeadingDenominator)
        );
        assert_eq!(
            zoh(&[1.0, 0.0, 0.0], &[1.0, 1.0], 0.1),
            Err(FilterError::Improper { num: 3, den: 2 })
        );
        assert_eq!(
            zoh(&[f64::NAN], &[1.0, 1.0], 0.1),
            Err(FilterError::NonFinite)
        );
        assert_eq!(
            zoh(&[1.0], &[1.0, 1.0], 0.0),
            Err(FilterError::InvalidTimestep(0.0))
        );
    }

    #[test]
    fn charpoly_of_triangular() {
        let a = ndarray::arr2(&[[2.0, 1.0], [0.0, 3.0]]);
        assert_close(&charpoly(&a), &[1.0, -5.0, 6.0]);
    }

    #[test]
    fn expm_of_diagonal() {
        let m = ndarray::arr2(&[[1.0, 0.0], [0.0, -2.0]]);
        let e = expm(&m).unwrap();
        assert!((e[[0, 0]] - 1f64.exp()).abs() < 1e-12);
        assert!((e[[1, 1]] - (-2f64).exp()).abs() < 1e-12);
        assert!(e[[0, 1]].abs() < 1e-15);
    }

    #[test]
    fn huge_exponent_is_non_finite() {
        assert_eq!(
            zoh(&[1.0], &[1e-10, 1.0], 1e300),
            Err(FilterError::NonFinite)
        );
        let m = ndarray::arr2(&[[f64::MAX, f64::MAX], [0.0, 0.0]]);
        assert_eq!(expm(&m), Err(FilterError::NonFinite));
    }

    #[test]
    fn expm_rejects_more_squarings_than_the_cap() {
        let m = ndarray::arr2(&[[-2f64.powi(MAX_SQUARINGS + 1)]]);
        assert_eq!(expm(&m), Err(FilterError::NonFinite));
    }
}
