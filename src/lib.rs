//! # madamcs
//!
//! The MadamCS optimizer: a multiplicative, sign aware, adaptive update rule with a
//! per-parameter magnitude clamp and an optional per-unit normalization constraint.
//!
//! A training loop registers its tensors in a `ParameterStore` (or uses the bundled
//! `GroupedStore`), sets the gradients of each iteration and calls `Optimizer::step`.

pub mod config;
pub mod error;
pub mod optimization;
mod reduce;
pub mod state;
pub mod storage;

pub use config::MadamCsConfig;
pub use error::{MadamErr, Result};
pub use optimization::{MadamCs, Optimizer};
pub use state::{ParamState, SavedParamState, StateDict};
pub use storage::{GroupedStore, ParamId, ParamSlot, ParameterStore};
