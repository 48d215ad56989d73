// src/nn/parameter.rs
// Trainable arrays with an accumulated gradient slot.

use crate::backend::OrdinalFloat;
use crate::error::{OrdinalError, Result};
use ndarray::{ArrayD, ArrayView1, ArrayView2, Ix1, Ix2, IxDyn};

/// A learnable array owned by a layer.
///
/// Gradients are accumulated by `Module::backward` and consumed by an
/// optimizer; `zero_grad` clears them between steps.
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::nn::Parameter;
///
/// let bias = Parameter::<f32>::zeros(&[4]).named("bias");
/// assert_eq!(bias.shape(), &[4]);
/// assert!(bias.grad.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Parameter<T>
where
    T: OrdinalFloat,
{
    /// Current value
    pub data: ArrayD<T>,
    /// Gradient accumulated since the last `zero_grad`
    pub grad: Option<ArrayD<T>>,
    /// Optional name for debugging
    pub name: Option<String>,
}

impl<T> Parameter<T>
where
    T: OrdinalFloat,
{
    pub fn new(data: ArrayD<T>) -> Self {
        Self {
            data,
            grad: None,
            name: None,
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)))
    }

    /// Builder-style naming, used when a layer assembles its parameters.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of scalar entries.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Views a rank-1 parameter (biases).
    pub fn view1(&self) -> Result<ArrayView1<'_, T>> {
        Ok(self.data.view().into_dimensionality::<Ix1>()?)
    }

    /// Views a rank-2 parameter (weight matrices).
    pub fn view2(&self) -> Result<ArrayView2<'_, T>> {
        Ok(self.data.view().into_dimensionality::<Ix2>()?)
    }

    /// Adds `grad` into the gradient slot, creating it on first use.
    pub fn accumulate_grad(&mut self, grad: ArrayD<T>) -> Result<()> {
        if grad.shape() != self.data.shape() {
            return Err(OrdinalError::shape(
                "parameter gradient",
                self.data.shape(),
                grad.shape(),
            ));
        }
        match self.grad.as_mut() {
            Some(existing) => *existing += &grad,
            None => self.grad = Some(grad),
        }
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad = None;
    }
}

impl<T> From<ArrayD<T>> for Parameter<T>
where
    T: OrdinalFloat,
{
    fn from(data: ArrayD<T>) -> Self {
        Self::new(data)
    }
}
