// src/nn/optim/mod.rs
// Optimizers consuming the gradients accumulated on `Parameter`s.

pub mod sgd;

use crate::backend::OrdinalFloat;
use crate::error::Result;
use crate::nn::parameter::Parameter;

pub use sgd::Sgd;

/// Base trait for optimizers.
///
/// Parameters are passed in on every step, in the order `Module::parameters_mut`
/// returns them; per-parameter state is keyed by that position.
pub trait Optimizer<T>
where
    T: OrdinalFloat,
{
    /// Perform one optimization step using the accumulated gradients.
    /// Parameters without a gradient are left untouched.
    fn step(&mut self, params: Vec<&mut Parameter<T>>) -> Result<()>;

    /// Get current learning rate
    fn get_lr(&self) -> T;

    /// Set learning rate
    fn set_lr(&mut self, lr: T);
}
