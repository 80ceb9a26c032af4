mod grouped;
mod id;
mod store;

pub use grouped::{GroupedStore, Param, ParamGroup};
pub use id::ParamId;
pub use store::{ParamSlot, ParameterStore};
