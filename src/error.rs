use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::storage::ParamId;

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, MadamErr>;

/// The optimizer's error type.
///
/// Numeric degeneracies (zero divided by zero, a unit with zero norm) are never
/// reported here, they show up as values inside the parameters. These variants
/// cover misuse of the engine and of its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum MadamErr {
    ShapeMismatch {
        id: ParamId,
        what: &'static str,
        got: Vec<usize>,
        expected: Vec<usize>,
    },
    DuplicateParam {
        id: ParamId,
    },
    UnknownParam {
        id: ParamId,
    },
    InvalidConfig {
        field: &'static str,
        value: f32,
    },
    StateMismatch {
        id: ParamId,
        got: usize,
        expected: usize,
    },
    InvalidSavedMax {
        id: ParamId,
        max: f32,
    },
    NotEnoughDims {
        got: usize,
        expected: usize,
    },
}

impl Display for MadamErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MadamErr::ShapeMismatch {
                id,
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for the {what} of parameter {id}: got {got:?}, expected {expected:?}"
            ),
            MadamErr::DuplicateParam { id } => {
                write!(f, "parameter {id} was yielded more than once in a single step")
            }
            MadamErr::UnknownParam { id } => write!(f, "there is no parameter with id {id}"),
            MadamErr::InvalidConfig { field, value } => {
                write!(f, "invalid value {value} for the optimizer's {field}")
            }
            MadamErr::StateMismatch { id, got, expected } => write!(
                f,
                "the saved state of parameter {id} holds {got} values but its shape requires {expected}"
            ),
            MadamErr::InvalidSavedMax { id, max } => write!(
                f,
                "the saved bound of parameter {id} is {max}, it must be a non negative number"
            ),
            MadamErr::NotEnoughDims { got, expected } => write!(
                f,
                "the operation needs a tensor with at least {expected} dimensions, got {got}"
            ),
        }
    }
}

impl Error for MadamErr {}
