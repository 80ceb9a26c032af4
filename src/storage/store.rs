use ndarray::ArrayD;

use super::ParamId;

/// A single parameter as seen by the optimizer during one step.
///
/// The slot borrows the parameter mutably and its gradient immutably, so the optimizer
/// can update the tensor in place without ever owning it.
#[derive(Debug)]
pub struct ParamSlot<'s> {
    /// The stable identity of the parameter.
    pub id: ParamId,
    /// The learning rate of the parameter's group, `None` to use the optimizer's own.
    pub lr: Option<f32>,
    /// The parameter values.
    pub param: &'s mut ArrayD<f32>,
    /// The gradient computed for this iteration, `None` if the parameter should be skipped.
    pub grad: Option<&'s ArrayD<f32>>,
}

/// Defines the collection of parameters an optimizer works on.
///
/// Implementors own the parameters and their gradients, they may wrap a framework's
/// native tensors or simply hold plain arrays like `GroupedStore` does.
pub trait ParameterStore {
    /// Borrows every registered parameter for a single optimization step.
    ///
    /// # Returns
    /// One slot per parameter, every id must appear at most once.
    fn slots(&mut self) -> Vec<ParamSlot<'_>>;
}
