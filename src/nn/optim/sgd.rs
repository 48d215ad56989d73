use crate::backend::OrdinalFloat;
use crate::error::{OrdinalError, Result};
use crate::nn::optim::Optimizer;
use crate::nn::parameter::Parameter;
use ndarray::ArrayD;
use std::collections::HashMap;

/// Stochastic Gradient Descent optimizer with momentum and weight decay
/// Uses proper L2 weight decay (not AdamW-style decoupled weight decay)
#[derive(Debug, Clone)]
pub struct Sgd<T>
where
    T: OrdinalFloat,
{
    lr: T,
    momentum: T,
    weight_decay: T,
    nesterov: bool,
    momentum_buffers: HashMap<usize, ArrayD<T>>,
}

impl<T> Sgd<T>
where
    T: OrdinalFloat,
{
    pub fn new(lr: T, momentum: T, weight_decay: T, nesterov: bool) -> Result<Self> {
        if !(lr > T::zero()) {
            return Err(OrdinalError::invalid(format!("learning rate must be positive, got {}", lr)));
        }
        if momentum < T::zero() || weight_decay < T::zero() {
            return Err(OrdinalError::invalid(
                "momentum and weight decay must be non-negative",
            ));
        }
        Ok(Self {
            lr,
            momentum,
            weight_decay,
            nesterov,
            momentum_buffers: HashMap::new(),
        })
    }

    pub fn with_defaults(lr: T) -> Result<Self> {
        Self::new(lr, T::zero(), T::zero(), false)
    }

    pub fn with_momentum(lr: T, momentum: T) -> Result<Self> {
        Self::new(lr, momentum, T::zero(), false)
    }

    pub fn set_nesterov(&mut self, nesterov: bool) {
        self.nesterov = nesterov;
    }

    // effective_grad = grad + weight_decay * params
    fn effective_grad(&self, param: &Parameter<T>, grad: &ArrayD<T>) -> ArrayD<T> {
        if self.weight_decay == T::zero() {
            return grad.clone();
        }
        let mut effective = grad.clone();
        effective.scaled_add(self.weight_decay, &param.data);
        effective
    }

    fn compute_update(&mut self, index: usize, effective_grad: ArrayD<T>) -> Result<ArrayD<T>> {
        if self.momentum == T::zero() {
            return Ok(effective_grad);
        }

        let momentum = self.momentum;
        let buffer = self
            .momentum_buffers
            .entry(index)
            .or_insert_with(|| ArrayD::zeros(effective_grad.raw_dim()));
        // Buffers are keyed by position; a different parameter in that slot is a caller error.
        if buffer.shape() != effective_grad.shape() {
            return Err(OrdinalError::shape(
                "sgd momentum buffer",
                buffer.shape(),
                effective_grad.shape(),
            ));
        }
        // buf = momentum * buf + grad
        buffer.mapv_inplace(|v| v * momentum);
        *buffer += &effective_grad;

        if self.nesterov {
            let mut update = effective_grad;
            update.scaled_add(momentum, buffer);
            Ok(update)
        } else {
            Ok(buffer.clone())
        }
    }

    /// Drops the momentum state, e.g. before stepping a different parameter list.
    pub fn reset_state(&mut self) {
        self.momentum_buffers.clear();
    }
}

impl<T> Optimizer<T> for Sgd<T>
where
    T: OrdinalFloat,
{
    fn step(&mut self, params: Vec<&mut Parameter<T>>) -> Result<()> {
        for (index, param) in params.into_iter().enumerate() {
            let Some(grad) = param.grad.as_ref() else {
                continue;
            };
            if grad.shape() != param.data.shape() {
                return Err(OrdinalError::shape(
                    "sgd gradient",
                    param.data.shape(),
                    grad.shape(),
                ));
            }
            let effective_grad = self.effective_grad(param, grad);
            let update = self.compute_update(index, effective_grad)?;
            param.data.scaled_add(-self.lr, &update);
        }
        Ok(())
    }

    fn get_lr(&self) -> T {
        self.lr
    }

    fn set_lr(&mut self, lr: T) {
        self.lr = lr;
    }
}
