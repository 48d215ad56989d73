// src/nn/layers/coral.rs
// CORAL output head: one shared weight vector, K - 1 independent biases.

use crate::backend::OrdinalFloat;
use crate::config::CoralLayerConfig;
use crate::error::{OrdinalError, Result};
use crate::nn::Module;
use crate::nn::initializers::xavier_uniform;
use crate::nn::parameter::Parameter;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use tracing::debug;

/// Rank-consistent output layer: `logits[n, k] = x_n . w + b_k`.
///
/// All `K - 1` outputs share the weight vector `w` (stored as `[1, in_features]`)
/// and differ only by their bias. The biases are free parameters: nothing keeps
/// `b_0 >= b_1 >= ...` during training, the CORAL loss only pushes towards it.
#[derive(Debug, Clone)]
pub struct CoralLayer<T>
where
    T: OrdinalFloat,
{
    /// Shared weight [1, in_features]
    pub weight: Parameter<T>,
    /// Per-threshold bias [num_classes - 1]
    pub bias: Parameter<T>,
    pub in_features: usize,
    pub num_classes: usize,
}

impl<T> CoralLayer<T>
where
    T: OrdinalFloat,
{
    /// Head with default configuration (biases pre-initialised).
    pub fn new<R>(in_features: usize, num_classes: usize, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        Self::from_config(&CoralLayerConfig::new(in_features, num_classes), rng)
    }

    pub fn from_config<R>(config: &CoralLayerConfig, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        let tasks = config.num_tasks()?;

        let weight = Parameter::new(xavier_uniform(
            &[1, config.in_features],
            config.in_features,
            1,
            1.0,
            rng,
        )?)
        .named("coral_weight");

        let bias = if config.preinit_bias {
            // [K-1, K-2, ..., 1] / (K-1)
            let scale = T::from_count(tasks);
            Array1::from_shape_fn(tasks, |k| T::from_count(tasks - k) / scale)
        } else {
            Array1::zeros(tasks)
        };

        debug!(
            in_features = config.in_features,
            num_classes = config.num_classes,
            preinit_bias = config.preinit_bias,
            "created coral layer"
        );
        Ok(Self {
            weight,
            bias: Parameter::new(bias.into_dyn()).named("coral_bias"),
            in_features: config.in_features,
            num_classes: config.num_classes,
        })
    }

    /// Builds a head from an explicit shared weight `[in_features]` and bias `[K - 1]`.
    pub fn from_arrays(weight: Array1<T>, bias: Array1<T>) -> Result<Self> {
        if weight.is_empty() {
            return Err(OrdinalError::invalid("coral weight must not be empty"));
        }
        if bias.is_empty() {
            return Err(OrdinalError::invalid(
                "coral bias needs at least one threshold (num_classes >= 2)",
            ));
        }
        let in_features = weight.len();
        let num_classes = bias.len() + 1;
        Ok(Self {
            weight: Parameter::new(weight.insert_axis(Axis(0)).into_dyn()).named("coral_weight"),
            bias: Parameter::new(bias.into_dyn()).named("coral_bias"),
            in_features,
            num_classes,
        })
    }

    pub fn num_tasks(&self) -> usize {
        self.num_classes - 1
    }

    fn check_input(&self, input: &ArrayView2<'_, T>) -> Result<()> {
        if input.ncols() != self.in_features {
            return Err(OrdinalError::shape(
                "coral layer input",
                &[input.nrows(), self.in_features],
                input.shape(),
            ));
        }
        Ok(())
    }
}

impl<T> Module<T> for CoralLayer<T>
where
    T: OrdinalFloat,
{
    /// Input [batch_size, in_features] -> logits [batch_size, num_classes - 1]
    fn forward(&self, input: ArrayView2<'_, T>) -> Result<Array2<T>> {
        self.check_input(&input)?;
        let weight = self.weight.view2()?;
        let bias = self.bias.view1()?;

        // One score per example, broadcast against every bias.
        let scores = input.dot(&weight.row(0));
        Ok(Array2::from_shape_fn((input.nrows(), bias.len()), |(n, k)| {
            scores[n] + bias[k]
        }))
    }

    fn backward(
        &mut self,
        input: ArrayView2<'_, T>,
        grad_output: ArrayView2<'_, T>,
    ) -> Result<Array2<T>> {
        self.check_input(&input)?;
        let tasks = self.num_tasks();
        if grad_output.dim() != (input.nrows(), tasks) {
            return Err(OrdinalError::shape(
                "coral layer grad_output",
                &[input.nrows(), tasks],
                grad_output.shape(),
            ));
        }

        // Every logit in a row depends on the same score x_n . w.
        let score_grad = grad_output.sum_axis(Axis(1));
        let grad_input = score_grad
            .view()
            .insert_axis(Axis(1))
            .dot(&self.weight.view2()?);
        let grad_weight = input.t().dot(&score_grad).insert_axis(Axis(0));

        self.weight.accumulate_grad(grad_weight.into_dyn())?;
        self.bias
            .accumulate_grad(grad_output.sum_axis(Axis(0)).into_dyn())?;
        Ok(grad_input)
    }

    fn parameters(&self) -> Vec<&Parameter<T>> {
        vec![&self.weight, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter<T>> {
        vec![&mut self.weight, &mut self.bias]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_forward_shares_weight_across_thresholds() {
        let layer = CoralLayer::from_arrays(array![0.5, -1.0], array![1.0, 0.0, -1.0]).unwrap();
        let logits = layer.forward(array![[2.0, 1.0], [2.0, 0.0]].view()).unwrap();
        assert_eq!(logits, array![[1.0, 0.0, -1.0], [2.0, 1.0, 0.0]]);
        // Differences between columns only come from the biases.
        for row in logits.rows() {
            assert_abs_diff_eq!(row[0] - row[1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_preinit_bias_is_descending() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = CoralLayer::<f64>::new(6, 5, &mut rng).unwrap();
        assert_abs_diff_eq!(
            layer.bias.view1().unwrap().to_owned(),
            array![1.0, 0.75, 0.5, 0.25],
            epsilon = 1e-12
        );
        assert_eq!(layer.weight.shape(), &[1, 6]);
        assert_eq!(layer.num_parameters(), 6 + 4);
    }

    #[test]
    fn test_zero_bias_without_preinit() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = CoralLayerConfig::new(3, 4).with_preinit_bias(false);
        let layer = CoralLayer::<f32>::from_config(&config, &mut rng).unwrap();
        assert!(layer.bias.data.iter().all(|&b| b == 0.0));
        assert_eq!(layer.num_tasks(), 3);
    }

    #[test]
    fn test_backward_matches_manual_gradient() {
        let mut layer = CoralLayer::from_arrays(array![1.0, 2.0], array![0.0, 0.0, 0.0]).unwrap();
        let input = array![[1.0, 0.0], [0.0, 3.0]];
        let grad_output = array![[1.0, 1.0, 0.0], [0.5, 0.0, -1.0]];

        let grad_input = layer.backward(input.view(), grad_output.view()).unwrap();
        // Row sums: [2, -0.5]
        assert_abs_diff_eq!(grad_input, array![[2.0, 4.0], [-0.5, -1.0]], epsilon = 1e-12);
        assert_abs_diff_eq!(
            layer.weight.grad.clone().unwrap(),
            array![[2.0, -1.5]].into_dyn(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            layer.bias.grad.clone().unwrap(),
            array![1.5, 1.0, -1.0].into_dyn(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rejects_wrong_input_width_and_degenerate_heads() {
        let layer = CoralLayer::from_arrays(array![1.0f32, 1.0], array![0.0]).unwrap();
        assert!(matches!(
            layer.forward(array![[1.0f32]].view()),
            Err(OrdinalError::ShapeMismatch { .. })
        ));
        assert!(CoralLayer::<f32>::from_arrays(array![1.0], Array1::zeros(0)).is_err());

        let mut rng = StdRng::seed_from_u64(0);
        assert!(CoralLayer::<f32>::new(4, 1, &mut rng).is_err());
    }
}
