// src/nn/layers/linear.rs
// Plain affine layer: the unconstrained K - 1 unit head used with CORN.

use crate::backend::OrdinalFloat;
use crate::error::{OrdinalError, Result};
use crate::nn::Module;
use crate::nn::initializers::xavier_uniform;
use crate::nn::parameter::Parameter;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use tracing::debug;

/// Linear transformation layer: y = x * W^T + b
/// Weight matrix is stored as [out_features, in_features] to match PyTorch convention
#[derive(Debug, Clone)]
pub struct Linear<T>
where
    T: OrdinalFloat,
{
    /// Weight matrix [out_features, in_features]
    pub weight: Parameter<T>,
    /// Optional bias vector [out_features]
    pub bias: Option<Parameter<T>>,
    pub in_features: usize,
    pub out_features: usize,
}

impl<T> Linear<T>
where
    T: OrdinalFloat,
{
    /// Create a new linear layer with Xavier uniform weights and zero bias
    pub fn new<R>(in_features: usize, out_features: usize, bias: bool, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        check_sizes(in_features, out_features)?;
        let weight = Parameter::new(xavier_uniform(
            &[out_features, in_features],
            in_features,
            out_features,
            1.0,
            rng,
        )?)
        .named("weight");
        let bias = bias.then(|| Parameter::zeros(&[out_features]).named("bias"));

        debug!(in_features, out_features, has_bias = bias.is_some(), "created linear layer");
        Ok(Self {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    /// Create linear layer with custom weight and bias arrays
    pub fn from_arrays(weight: Array2<T>, bias: Option<Array1<T>>) -> Result<Self> {
        let (out_features, in_features) = weight.dim();
        check_sizes(in_features, out_features)?;
        if let Some(ref b) = bias {
            if b.len() != out_features {
                return Err(OrdinalError::shape("linear bias", &[out_features], b.shape()));
            }
        }
        Ok(Self {
            weight: Parameter::new(weight.into_dyn()).named("weight"),
            bias: bias.map(|b| Parameter::new(b.into_dyn()).named("bias")),
            in_features,
            out_features,
        })
    }

    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    fn check_input(&self, input: &ArrayView2<'_, T>) -> Result<()> {
        if input.ncols() != self.in_features {
            return Err(OrdinalError::shape(
                "linear input",
                &[input.nrows(), self.in_features],
                input.shape(),
            ));
        }
        Ok(())
    }
}

fn check_sizes(in_features: usize, out_features: usize) -> Result<()> {
    if in_features == 0 || out_features == 0 {
        return Err(OrdinalError::invalid(format!(
            "linear layer needs positive sizes, got {} -> {}",
            in_features, out_features
        )));
    }
    Ok(())
}

impl<T> Module<T> for Linear<T>
where
    T: OrdinalFloat,
{
    /// Forward pass: y = x @ W^T + b
    /// Input shape: [batch_size, in_features]
    /// Output shape: [batch_size, out_features]
    fn forward(&self, input: ArrayView2<'_, T>) -> Result<Array2<T>> {
        self.check_input(&input)?;
        let weight = self.weight.view2()?;
        let mut output = input.dot(&weight.t());
        if let Some(ref bias) = self.bias {
            output += &bias.view1()?;
        }
        Ok(output)
    }

    fn backward(
        &mut self,
        input: ArrayView2<'_, T>,
        grad_output: ArrayView2<'_, T>,
    ) -> Result<Array2<T>> {
        self.check_input(&input)?;
        if grad_output.dim() != (input.nrows(), self.out_features) {
            return Err(OrdinalError::shape(
                "linear grad_output",
                &[input.nrows(), self.out_features],
                grad_output.shape(),
            ));
        }

        let grad_input = grad_output.dot(&self.weight.view2()?);
        // dW = g^T x, db = sum of g over the batch
        let grad_weight = grad_output.t().dot(&input);
        self.weight.accumulate_grad(grad_weight.into_dyn())?;
        if let Some(ref mut bias) = self.bias {
            bias.accumulate_grad(grad_output.sum_axis(Axis(0)).into_dyn())?;
        }
        Ok(grad_input)
    }

    fn parameters(&self) -> Vec<&Parameter<T>> {
        let mut params = vec![&self.weight];
        if let Some(ref bias) = self.bias {
            params.push(bias);
        }
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter<T>> {
        let mut params = vec![&mut self.weight];
        if let Some(ref mut bias) = self.bias {
            params.push(bias);
        }
        params
    }
}
