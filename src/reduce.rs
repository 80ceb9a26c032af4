//! Reductions over `f32` tensors, accumulated in `f64` so large tensors don't lose
//! the tail of the sum.

use ndarray::{ArrayBase, Data, Dimension};

/// Sum of the squared elements.
pub(crate) fn sum_sq<S, D>(x: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    x.iter().map(|&v| f64::from(v) * f64::from(v)).sum()
}

/// Arithmetic mean, NaN for an empty tensor.
pub(crate) fn mean<S, D>(x: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    x.iter().map(|&v| f64::from(v)).sum::<f64>() / x.len() as f64
}

/// Root mean square, zero for an empty tensor.
pub(crate) fn rms<S, D>(x: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    if x.is_empty() {
        return 0.;
    }

    (sum_sq(x) / x.len() as f64).sqrt()
}

/// Euclidean norm.
pub(crate) fn norm<S, D>(x: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    sum_sq(x).sqrt()
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, arr1};

    use super::*;

    #[test]
    fn small_values() {
        let x = arr1(&[3f32, -4.]);
        assert_eq!(sum_sq(&x), 25.);
        assert_eq!(norm(&x), 5.);
        assert_eq!(mean(&x), -0.5);
        assert!((rms(&x) - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_tensor() {
        let x = Array1::<f32>::zeros(0);
        assert_eq!(rms(&x), 0.);
        assert!(mean(&x).is_nan());
    }

    #[test]
    fn long_sums_keep_their_tail() {
        const LEN: usize = 1 << 24;

        let x = Array1::from_elem(LEN, 1f32);
        assert_eq!(sum_sq(&x), LEN as f64);
        assert_eq!(mean(&x), 1.);
    }
}
