use ndarray::ArrayD;

use super::{ParamId, ParamSlot, ParameterStore};
use crate::{MadamErr, Result};

/// A trainable tensor together with the gradient of the current iteration.
#[derive(Debug, Clone)]
pub struct Param {
    id: ParamId,
    value: ArrayD<f32>,
    grad: Option<ArrayD<f32>>,
}

impl Param {
    /// Returns the id assigned to this parameter by its store.
    pub fn id(&self) -> ParamId {
        self.id
    }

    /// Returns the current parameter values.
    pub fn value(&self) -> &ArrayD<f32> {
        &self.value
    }

    /// Returns the gradient set for this iteration, if any.
    pub fn grad(&self) -> Option<&ArrayD<f32>> {
        self.grad.as_ref()
    }
}

/// A set of parameters sharing the same learning rate.
#[derive(Debug, Clone)]
pub struct ParamGroup {
    lr: Option<f32>,
    params: Vec<Param>,
}

impl ParamGroup {
    /// Returns the learning rate override of this group.
    pub fn lr(&self) -> Option<f32> {
        self.lr
    }

    /// Returns the parameters of this group in insertion order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// An in-memory `ParameterStore` organized in parameter groups.
///
/// Ids are handed out sequentially and never reused.
#[derive(Debug, Clone, Default)]
pub struct GroupedStore {
    groups: Vec<ParamGroup>,
    next_id: u64,
}

impl GroupedStore {
    /// Creates a new empty `GroupedStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new group of parameters.
    ///
    /// # Arguments
    /// * `lr` - The learning rate for this group, `None` to use the optimizer's.
    /// * `params` - The initial values of the parameters.
    ///
    /// # Returns
    /// The ids of the new parameters, in the same order they were given.
    pub fn add_group<I>(&mut self, lr: Option<f32>, params: I) -> Vec<ParamId>
    where
        I: IntoIterator<Item = ArrayD<f32>>,
    {
        let params: Vec<_> = params
            .into_iter()
            .map(|value| {
                let id = ParamId::new(self.next_id);
                self.next_id += 1;

                Param {
                    id,
                    value,
                    grad: None,
                }
            })
            .collect();

        let ids = params.iter().map(Param::id).collect();
        self.groups.push(ParamGroup { lr, params });
        ids
    }

    /// Returns the registered groups.
    pub fn groups(&self) -> &[ParamGroup] {
        &self.groups
    }

    /// Looks up a parameter by id.
    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.groups
            .iter()
            .flat_map(|group| &group.params)
            .find(|param| param.id == id)
    }

    fn param_mut(&mut self, id: ParamId) -> Option<&mut Param> {
        self.groups
            .iter_mut()
            .flat_map(|group| &mut group.params)
            .find(|param| param.id == id)
    }

    /// Sets the gradient of a parameter for the next step.
    ///
    /// # Arguments
    /// * `id` - The parameter the gradient belongs to.
    /// * `grad` - The gradient, it must have the same shape as the parameter.
    ///
    /// # Returns
    /// An error if the id is unknown or the shapes differ.
    pub fn set_grad(&mut self, id: ParamId, grad: ArrayD<f32>) -> Result<()> {
        let param = self.param_mut(id).ok_or(MadamErr::UnknownParam { id })?;

        if grad.shape() != param.value.shape() {
            return Err(MadamErr::ShapeMismatch {
                id,
                what: "gradient",
                got: grad.shape().to_vec(),
                expected: param.value.shape().to_vec(),
            });
        }

        param.grad = Some(grad);
        Ok(())
    }

    /// Overwrites the values of a parameter.
    ///
    /// # Returns
    /// An error if the id is unknown or the shapes differ.
    pub fn set_value(&mut self, id: ParamId, value: ArrayD<f32>) -> Result<()> {
        let param = self.param_mut(id).ok_or(MadamErr::UnknownParam { id })?;

        if value.shape() != param.value.shape() {
            return Err(MadamErr::ShapeMismatch {
                id,
                what: "value",
                got: value.shape().to_vec(),
                expected: param.value.shape().to_vec(),
            });
        }

        param.value = value;
        Ok(())
    }

    /// Drops every gradient, the next step skips all parameters until new ones are set.
    pub fn zero_grad(&mut self) {
        self.groups
            .iter_mut()
            .flat_map(|group| &mut group.params)
            .for_each(|param| param.grad = None);
    }

    /// Changes the learning rate override of a group.
    ///
    /// # Returns
    /// `None` if there is no group at index `group`.
    pub fn set_group_lr(&mut self, group: usize, lr: Option<f32>) -> Option<()> {
        self.groups.get_mut(group)?.lr = lr;
        Some(())
    }

    /// Returns the total amount of registered parameters.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.params.len()).sum()
    }

    /// Returns whether there are no registered parameters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ParameterStore for GroupedStore {
    fn slots(&mut self) -> Vec<ParamSlot<'_>> {
        self.groups
            .iter_mut()
            .flat_map(|group| {
                let lr = group.lr;

                group.params.iter_mut().map(move |param| ParamSlot {
                    id: param.id,
                    lr,
                    param: &mut param.value,
                    grad: param.grad.as_ref(),
                })
            })
            .collect()
    }
}
