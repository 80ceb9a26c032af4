pub mod constraint;
mod madamcs;
mod optimizer;

pub use madamcs::MadamCs;
pub use optimizer::Optimizer;
