use serde::{Deserialize, Serialize};

use crate::{MadamErr, Result};

/// Immutable hyperparameters of a `MadamCs` optimizer.
///
/// Deserializing fills every missing field with its default, so a JSON document only
/// needs to name the values it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MadamCsConfig {
    lr: f32,
    p_scale: f32,
    g_bound: f32,
    constraints: bool,
    parallel: bool,
}

impl Default for MadamCsConfig {
    fn default() -> Self {
        Self {
            lr: 0.01,
            p_scale: 3.0,
            g_bound: 10.0,
            constraints: false,
            parallel: false,
        }
    }
}

impl MadamCsConfig {
    /// Creates a configuration with the given learning rate and defaults everywhere else.
    pub fn new(lr: f32) -> Self {
        Self {
            lr,
            ..Self::default()
        }
    }

    /// Sets the learning rate.
    pub fn with_lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    /// Sets the multiplier applied to a parameter's initial RMS to obtain its clamp bound.
    pub fn with_p_scale(mut self, p_scale: f32) -> Self {
        self.p_scale = p_scale;
        self
    }

    /// Sets the bound of the normalized gradient.
    pub fn with_g_bound(mut self, g_bound: f32) -> Self {
        self.g_bound = g_bound;
        self
    }

    /// Enables or disables the per-unit mean subtraction and normalization.
    pub fn with_constraints(mut self, constraints: bool) -> Self {
        self.constraints = constraints;
        self
    }

    /// Runs the per-parameter updates of a step on the rayon thread pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn lr(&self) -> f32 {
        self.lr
    }

    pub fn p_scale(&self) -> f32 {
        self.p_scale
    }

    pub fn g_bound(&self) -> f32 {
        self.g_bound
    }

    pub fn constraints(&self) -> bool {
        self.constraints
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Checks that every hyperparameter is usable.
    ///
    /// # Returns
    /// An `InvalidConfig` error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("lr", self.lr, self.lr >= 0.),
            ("p_scale", self.p_scale, self.p_scale > 0.),
            ("g_bound", self.g_bound, self.g_bound > 0.),
        ];

        for (field, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(MadamErr::InvalidConfig { field, value });
            }
        }

        Ok(())
    }
}
