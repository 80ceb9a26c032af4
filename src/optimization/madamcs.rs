use std::collections::{HashMap, HashSet};

use log::{debug, info, trace};
use ndarray::{ArrayD, Zip};
use rayon::prelude::*;

use super::{Optimizer, constraint};
use crate::{
    MadamCsConfig, MadamErr, Result,
    state::{ParamState, SavedParamState, StateDict},
    storage::{ParamId, ParameterStore},
};

/// Decay of the squared gradient moving average.
const BETA2: f64 = 0.999;

/// The MadamCS optimization algorithm.
///
/// A multiplicative, sign aware variant of Adam: every element is scaled by
/// `exp(-lr * g_normed * sign(p))`, where `g_normed` is the gradient divided by the root
/// of its bias corrected second moment. Each parameter is then clamped to a bound derived
/// from its initial magnitude and, optionally, every unit of a parameter with more than
/// one dimension is centered and normalized.
///
/// The per-parameter state lives inside the optimizer, keyed by `ParamId`, and is created
/// the first time a parameter receives a gradient.
#[derive(Debug, Clone)]
pub struct MadamCs {
    config: MadamCsConfig,
    states: HashMap<ParamId, ParamState>,
}

impl MadamCs {
    /// Creates a new `MadamCs` optimizer.
    ///
    /// # Arguments
    /// * `config` - The hyperparameters of the algorithm.
    ///
    /// # Returns
    /// An error if the configuration is invalid.
    pub fn new(config: MadamCsConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            states: HashMap::new(),
        })
    }

    /// Recreates an optimizer from a snapshot taken with `state_dict`.
    ///
    /// # Returns
    /// An error if the saved configuration or any saved state is invalid.
    pub fn from_state_dict(dict: StateDict) -> Result<Self> {
        let mut optimizer = Self::new(dict.config)?;
        optimizer.load_state_dict(dict)?;
        Ok(optimizer)
    }

    /// Returns the hyperparameters of this optimizer.
    pub fn config(&self) -> &MadamCsConfig {
        &self.config
    }

    /// Returns the state of a parameter, `None` if it was never updated.
    pub fn state(&self, id: ParamId) -> Option<&ParamState> {
        self.states.get(&id)
    }

    /// Takes a snapshot of the configuration and of every parameter's state.
    pub fn state_dict(&self) -> StateDict {
        let mut params: Vec<_> = self
            .states
            .iter()
            .map(|(&id, state)| SavedParamState::new(id, state))
            .collect();

        params.sort_unstable_by_key(|saved| saved.id);

        StateDict {
            config: self.config,
            params,
        }
    }

    /// Replaces every parameter's state with the one stored in `dict`.
    ///
    /// The configuration is fixed at construction, the one inside `dict` is ignored. On
    /// error the current state is kept as is.
    ///
    /// # Returns
    /// A `StateMismatch` error if a saved buffer doesn't match its shape, an
    /// `InvalidSavedMax` error for a NaN or negative bound and a `DuplicateParam` error
    /// if an id is saved more than once.
    pub fn load_state_dict(&mut self, dict: StateDict) -> Result<()> {
        let mut states = HashMap::with_capacity(dict.params.len());

        for saved in dict.params {
            let id = saved.id;
            if states.insert(id, saved.restore()?).is_some() {
                return Err(MadamErr::DuplicateParam { id });
            }
        }

        info!(params = states.len(); "loaded optimizer state");
        self.states = states;
        Ok(())
    }
}

impl Optimizer for MadamCs {
    fn step<S: ParameterStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        let config = self.config;
        let slots = store.slots();
        let total = slots.len();

        let mut seen = HashSet::with_capacity(total);
        let mut pending = Vec::with_capacity(total);

        for slot in slots {
            if !seen.insert(slot.id) {
                return Err(MadamErr::DuplicateParam { id: slot.id });
            }

            let Some(grad) = slot.grad else {
                continue;
            };

            check_shape(slot.id, "gradient", grad.shape(), slot.param.shape())?;
            if let Some(state) = self.states.get(&slot.id) {
                check_shape(
                    slot.id,
                    "optimizer state",
                    state.exp_avg_sq.shape(),
                    slot.param.shape(),
                )?;
            }

            let lr = slot.lr.unwrap_or(config.lr());
            pending.push((slot.id, lr, slot.param, grad));
        }

        let mut jobs: Vec<_> = pending
            .into_iter()
            .map(|(id, lr, param, grad)| {
                let state = match self.states.remove(&id) {
                    Some(state) => state,
                    None => {
                        let state = ParamState::new(param, config.p_scale());
                        debug!(param_id = id.get(), max = state.max; "initialized optimizer state");
                        state
                    }
                };

                Job {
                    id,
                    lr,
                    param,
                    grad,
                    state,
                }
            })
            .collect();

        let updated = jobs.len();

        if config.parallel() {
            jobs.par_iter_mut().for_each(|job| job.apply(&config));
        } else {
            jobs.iter_mut().for_each(|job| job.apply(&config));
        }

        self.states
            .extend(jobs.into_iter().map(|job| (job.id, job.state)));

        trace!(updated = updated, skipped = total - updated; "optimizer step finished");
        Ok(())
    }
}

/// The update of a single parameter, it holds the parameter's state while it's in flight.
struct Job<'s> {
    id: ParamId,
    lr: f32,
    param: &'s mut ArrayD<f32>,
    grad: &'s ArrayD<f32>,
    state: ParamState,
}

impl Job<'_> {
    fn apply(&mut self, config: &MadamCsConfig) {
        let state = &mut self.state;
        state.step += 1;

        let bias_correction = (1. - BETA2.powf(state.step as f64)) as f32;
        let decay = BETA2 as f32;
        let weight = (1. - BETA2) as f32;

        let lr = self.lr;
        let g_bound = config.g_bound();
        let max = state.max;

        Zip::from(&mut state.exp_avg_sq)
            .and(&mut *self.param)
            .and(self.grad)
            .for_each(|v, p, &g| {
                *v = decay * *v + weight * g * g;

                // 0 / 0 when there's no gradient history yet
                let g_normed = g / (*v / bias_correction).sqrt();
                let g_normed = if g_normed.is_nan() { 0. } else { g_normed };
                let g_normed = clamp_abs(g_normed, g_bound);

                *p = clamp_abs(*p * (-lr * g_normed * sign(*p)).exp(), max);
            });

        if config.constraints() && self.param.ndim() > 1 {
            constraint::apply_unit_constraint(self.param);
        }
    }
}

fn check_shape(id: ParamId, what: &'static str, got: &[usize], expected: &[usize]) -> Result<()> {
    if got != expected {
        return Err(MadamErr::ShapeMismatch {
            id,
            what,
            got: got.to_vec(),
            expected: expected.to_vec(),
        });
    }

    Ok(())
}

/// Zero for zero, unlike `f32::signum`.
fn sign(x: f32) -> f32 {
    if x > 0. {
        1.
    } else if x < 0. {
        -1.
    } else {
        0.
    }
}

/// Clamps `x` to `[-bound, bound]`, NaN goes through untouched.
fn clamp_abs(x: f32, bound: f32) -> f32 {
    if x > bound {
        bound
    } else if x < -bound {
        -bound
    } else {
        x
    }
}
