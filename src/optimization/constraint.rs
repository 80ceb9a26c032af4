//! Per-unit helpers, a unit being a slice of a tensor along its leading axis
//! (e.g. the incoming weights of one neuron).

use log::debug;
use ndarray::{Array1, ArrayD};

use crate::{
    MadamErr, Result,
    reduce::{mean, norm},
};

/// Computes the mean of every unit of `x`.
///
/// # Returns
/// A `NotEnoughDims` error if `x` has less than two dimensions.
pub fn unit_means(x: &ArrayD<f32>) -> Result<Array1<f32>> {
    if x.ndim() < 2 {
        return Err(MadamErr::NotEnoughDims {
            got: x.ndim(),
            expected: 2,
        });
    }

    Ok(x.outer_iter().map(|unit| mean(&unit) as f32).collect())
}

/// Computes the euclidean norm of every unit of `x`.
///
/// A tensor with less than two dimensions is made of scalar units, so its norms are
/// the absolute values of its elements.
pub fn unit_norms(x: &ArrayD<f32>) -> Array1<f32> {
    if x.ndim() < 2 {
        return x.iter().map(|v| v.abs()).collect();
    }

    x.outer_iter().map(|unit| norm(&unit) as f32).collect()
}

/// Centers every unit of `x` on zero and scales it to unit norm, in place.
///
/// Tensors with less than two dimensions are left untouched. A unit whose values are
/// all equal has a norm of zero once centered and ends up full of NaN.
pub fn apply_unit_constraint(x: &mut ArrayD<f32>) {
    if x.ndim() < 2 {
        return;
    }

    for (i, mut unit) in x.outer_iter_mut().enumerate() {
        let unit_mean = mean(&unit);
        unit.mapv_inplace(|v| (f64::from(v) - unit_mean) as f32);

        let unit_norm = norm(&unit);
        if unit_norm == 0. {
            debug!(unit = i; "unit has zero norm after centering");
        }

        unit.mapv_inplace(|v| (f64::from(v) / unit_norm) as f32);
    }
}
