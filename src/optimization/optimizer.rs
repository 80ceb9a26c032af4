use crate::{Result, storage::ParameterStore};

/// Defines the strategy for updating parameters based on their gradients.
pub trait Optimizer {
    /// Applies one update to every parameter of `store` that has a gradient.
    ///
    /// # Arguments
    /// * `store` - The parameters and the gradients of the current iteration.
    ///
    /// # Returns
    /// An error if the store is malformed, in which case no parameter is modified.
    fn step<S: ParameterStore + ?Sized>(&mut self, store: &mut S) -> Result<()>;

    /// Re-evaluates the model through `closure` and then performs a `step`.
    ///
    /// The closure runs exactly once, before any parameter is touched, and is expected to
    /// leave fresh gradients in the store.
    ///
    /// # Arguments
    /// * `store` - The parameters and the gradients of the current iteration.
    /// * `closure` - Computes the loss and the gradients.
    ///
    /// # Returns
    /// The value returned by `closure`.
    fn step_with_closure<S, F, L>(&mut self, store: &mut S, closure: F) -> Result<L>
    where
        S: ParameterStore + ?Sized,
        F: FnOnce(&mut S) -> L,
    {
        let loss = closure(&mut *store);
        self.step(store)?;
        Ok(loss)
    }
}
