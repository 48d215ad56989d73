use crate::backend::OrdinalFloat;
use crate::error::Result;
use crate::nn::parameter::Parameter;
use ndarray::{Array2, ArrayView2};

/// The base trait for the output heads in this crate.
///
/// A module maps a `(batch, in_features)` matrix to `(batch, K - 1)` logits
/// and can propagate a gradient of the loss with respect to those logits
/// back into its parameters.
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::nn::{CoralLayer, Module};
/// use ndarray::array;
///
/// let layer = CoralLayer::from_arrays(array![0.5f64, -1.0], array![1.0, 0.0, -1.0]).unwrap();
/// let logits = layer.forward(array![[2.0, 1.0]].view()).unwrap();
/// assert_eq!(logits, array![[1.0, 0.0, -1.0]]);
/// ```
pub trait Module<T>
where
    T: OrdinalFloat,
{
    /// Performs the forward pass on a batch.
    fn forward(&self, input: ArrayView2<'_, T>) -> Result<Array2<T>>;

    /// Accumulates parameter gradients given `grad_output = dL/d(output)` and
    /// returns `dL/d(input)` for whatever feature extractor sits upstream.
    fn backward(&mut self, input: ArrayView2<'_, T>, grad_output: ArrayView2<'_, T>)
    -> Result<Array2<T>>;

    /// Returns all parameters of this module.
    fn parameters(&self) -> Vec<&Parameter<T>> {
        Vec::new()
    }

    /// Returns mutable references to all parameters, for optimizers.
    fn parameters_mut(&mut self) -> Vec<&mut Parameter<T>> {
        Vec::new()
    }

    /// Clears the accumulated gradients of every parameter.
    fn zero_grad(&mut self) {
        for param in self.parameters_mut() {
            param.zero_grad();
        }
    }

    /// Returns the number of scalar parameters in this module.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }
}
