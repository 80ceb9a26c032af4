use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::{MadamCsConfig, MadamErr, Result, reduce, storage::ParamId};

/// The running statistics the optimizer keeps for a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamState {
    pub(crate) max: f32,
    pub(crate) step: u64,
    pub(crate) exp_avg_sq: ArrayD<f32>,
}

impl ParamState {
    /// Creates the state of a parameter on its first update.
    ///
    /// The clamp bound is `p_scale` times the root mean square of the current values, a
    /// parameter full of zeros therefore gets a bound of zero.
    ///
    /// # Arguments
    /// * `param` - The parameter's values at the time of its first update.
    /// * `p_scale` - The clamp bound multiplier.
    pub(crate) fn new(param: &ArrayD<f32>, p_scale: f32) -> Self {
        Self {
            max: (f64::from(p_scale) * reduce::rms(param)) as f32,
            step: 0,
            exp_avg_sq: ArrayD::zeros(param.raw_dim()),
        }
    }

    /// Returns the magnitude bound of the parameter.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Returns the amount of updates applied to the parameter.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Returns the moving average of the squared gradients.
    pub fn exp_avg_sq(&self) -> &ArrayD<f32> {
        &self.exp_avg_sq
    }
}

/// A flattened, serializable copy of a `ParamState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedParamState {
    pub id: ParamId,
    pub max: f32,
    pub step: u64,
    pub shape: Vec<usize>,
    pub exp_avg_sq: Vec<f32>,
}

impl SavedParamState {
    pub(crate) fn new(id: ParamId, state: &ParamState) -> Self {
        Self {
            id,
            max: state.max,
            step: state.step,
            shape: state.exp_avg_sq.shape().to_vec(),
            exp_avg_sq: state.exp_avg_sq.iter().copied().collect(),
        }
    }

    /// Rebuilds the live state.
    ///
    /// # Returns
    /// A `StateMismatch` error if the buffer doesn't fit the saved shape, an
    /// `InvalidSavedMax` error if the bound is NaN or negative.
    pub(crate) fn restore(self) -> Result<ParamState> {
        if self.max.is_nan() || self.max < 0. {
            return Err(MadamErr::InvalidSavedMax {
                id: self.id,
                max: self.max,
            });
        }

        let expected = self.shape.iter().product();
        let got = self.exp_avg_sq.len();

        let exp_avg_sq = ArrayD::from_shape_vec(IxDyn(&self.shape), self.exp_avg_sq)
            .map_err(|_| MadamErr::StateMismatch {
                id: self.id,
                got,
                expected,
            })?;

        Ok(ParamState {
            max: self.max,
            step: self.step,
            exp_avg_sq,
        })
    }
}

/// A snapshot of a whole optimizer, used to checkpoint and resume training.
///
/// Entries are sorted by parameter id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDict {
    pub config: MadamCsConfig,
    pub params: Vec<SavedParamState>,
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;

    use super::*;

    #[test]
    fn max_is_scaled_rms_of_initial_values() {
        let param = arr2(&[[1., -1.], [3., -3.]]).into_dyn();
        let state = ParamState::new(&param, 2.);

        // rms = sqrt((1 + 1 + 9 + 9) / 4) = sqrt(5)
        assert!((state.max() - 2. * 5f32.sqrt()).abs() < 1e-6);
        assert_eq!(state.step(), 0);
        assert_eq!(state.exp_avg_sq().shape(), [2, 2]);
        assert!(state.exp_avg_sq().iter().all(|&v| v == 0.));
    }

    #[test]
    fn max_of_a_large_parameter() {
        let param = ArrayD::from_elem(IxDyn(&[4096, 4096]), 0.02f32);
        let state = ParamState::new(&param, 3.);

        assert!((state.max() - 0.06).abs() < 1e-6, "max is {}", state.max());
    }

    #[test]
    fn restore_rejects_a_nan_or_negative_bound() {
        for max in [f32::NAN, -1.] {
            let saved = SavedParamState {
                id: ParamId::new(2),
                max,
                step: 1,
                shape: vec![1],
                exp_avg_sq: vec![0.],
            };

            let err = saved.restore().unwrap_err();
            assert!(matches!(err, MadamErr::InvalidSavedMax { .. }));
        }
    }

    #[test]
    fn zero_parameter_gets_zero_bound() {
        let param = ArrayD::zeros(IxDyn(&[3]));
        assert_eq!(ParamState::new(&param, 3.).max(), 0.);
    }

    #[test]
    fn restore_rejects_a_buffer_of_the_wrong_length() {
        let saved = SavedParamState {
            id: ParamId::new(7),
            max: 1.,
            step: 3,
            shape: vec![2, 2],
            exp_avg_sq: vec![0.; 3],
        };

        assert_eq!(
            saved.restore().unwrap_err(),
            MadamErr::StateMismatch {
                id: ParamId::new(7),
                got: 3,
                expected: 4
            }
        );
    }
}
