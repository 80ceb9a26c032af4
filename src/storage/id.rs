use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A stable identifier for a parameter, valid for the whole lifetime of the parameter.
///
/// The optimizer keys its per-parameter state with it, so a store must never hand out
/// the same id for two different parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParamId(u64);

impl ParamId {
    /// Creates a new `ParamId`.
    ///
    /// # Arguments
    /// * `raw` - The raw numeric value of the id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ParamId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
