// src/nn/losses/coral.rs
// CORAL loss: K - 1 weighted binary cross-entropies, every example in every task.

use crate::backend::OrdinalFloat;
use crate::dataset::levels_from_labelbatch;
use crate::error::{OrdinalError, Result};
use crate::nn::losses::{OrdinalLoss, ReductionType, check_logits, log_likelihood};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use tracing::trace;

/// CORAL loss averaged over the batch.
///
/// `logits` and `levels` are `(N, K - 1)`; `importance_weights`, if given,
/// has length `K - 1` and scales each task (all ones otherwise).
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::dataset::levels_from_labelbatch;
/// use coral_ordinal::nn::losses::coral_loss;
/// use ndarray::array;
///
/// let levels = levels_from_labelbatch::<f64>(array![3].view(), 5).unwrap();
/// let logits = array![[10.0, 10.0, 10.0, -10.0]];
/// let loss = coral_loss(logits.view(), levels.view(), None).unwrap();
/// assert!(loss < 1e-3);
/// ```
pub fn coral_loss<T>(
    logits: ArrayView2<'_, T>,
    levels: ArrayView2<'_, T>,
    importance_weights: Option<ArrayView1<'_, T>>,
) -> Result<T>
where
    T: OrdinalFloat,
{
    coral_loss_with_reduction(logits, levels, importance_weights, ReductionType::Mean)
}

/// CORAL loss with an explicit batch reduction.
pub fn coral_loss_with_reduction<T>(
    logits: ArrayView2<'_, T>,
    levels: ArrayView2<'_, T>,
    importance_weights: Option<ArrayView1<'_, T>>,
    reduction: ReductionType,
) -> Result<T>
where
    T: OrdinalFloat,
{
    let per_sample = coral_loss_per_sample(logits, levels, importance_weights)?;
    let total: T = per_sample.iter().sum();
    Ok(total * reduction.scale(per_sample.len()))
}

/// Unreduced CORAL loss, one value per example.
pub fn coral_loss_per_sample<T>(
    logits: ArrayView2<'_, T>,
    levels: ArrayView2<'_, T>,
    importance_weights: Option<ArrayView1<'_, T>>,
) -> Result<Array1<T>>
where
    T: OrdinalFloat,
{
    let weights = check_coral_inputs(&logits, &levels, importance_weights)?;
    trace!(batch = logits.nrows(), tasks = logits.ncols(), "coral loss forward");

    let mut per_sample = Array1::zeros(logits.nrows());
    Zip::from(&mut per_sample)
        .and(logits.rows())
        .and(levels.rows())
        .for_each(|loss, row_logits, row_levels| {
            let mut total = T::zero();
            for ((&z, &y), &w) in row_logits.iter().zip(row_levels.iter()).zip(weights.iter()) {
                total += log_likelihood(z, y) * w;
            }
            *loss = -total;
        });
    Ok(per_sample)
}

/// Gradient of the CORAL loss with respect to the logits:
/// `w_k * (sigmoid(z) - levels)`, scaled by the reduction.
pub fn coral_loss_grad<T>(
    logits: ArrayView2<'_, T>,
    levels: ArrayView2<'_, T>,
    importance_weights: Option<ArrayView1<'_, T>>,
    reduction: ReductionType,
) -> Result<Array2<T>>
where
    T: OrdinalFloat,
{
    let weights = check_coral_inputs(&logits, &levels, importance_weights)?;
    let scale: T = reduction.scale(logits.nrows());

    let mut grad = Array2::zeros(logits.raw_dim());
    for ((row_grad, row_logits), row_levels) in grad
        .rows_mut()
        .into_iter()
        .zip(logits.rows())
        .zip(levels.rows())
    {
        Zip::from(row_grad)
            .and(&row_logits)
            .and(&row_levels)
            .and(&weights)
            .for_each(|g, &z, &y, &w| *g = w * (z.sigmoid() - y) * scale);
    }
    Ok(grad)
}

/// Validates shapes and resolves the per-task weights (ones by default).
fn check_coral_inputs<T: OrdinalFloat>(
    logits: &ArrayView2<'_, T>,
    levels: &ArrayView2<'_, T>,
    importance_weights: Option<ArrayView1<'_, T>>,
) -> Result<Array1<T>> {
    if logits.shape() != levels.shape() {
        return Err(OrdinalError::shape(
            "coral_loss levels",
            logits.shape(),
            levels.shape(),
        ));
    }
    check_logits("coral_loss", logits)?;

    let tasks = logits.ncols();
    match importance_weights {
        Some(weights) if weights.len() != tasks => Err(OrdinalError::shape(
            "coral_loss importance_weights",
            &[tasks],
            weights.shape(),
        )),
        Some(weights) => Ok(weights.to_owned()),
        None => Ok(Array1::ones(tasks)),
    }
}

/// CORAL loss bound to a class count, fed with raw labels.
#[derive(Debug, Clone)]
pub struct CoralLoss<T>
where
    T: OrdinalFloat,
{
    num_classes: usize,
    importance_weights: Option<Array1<T>>,
    reduction: ReductionType,
}

impl<T> CoralLoss<T>
where
    T: OrdinalFloat,
{
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            importance_weights: None,
            reduction: ReductionType::Mean,
        }
    }

    pub fn with_importance_weights(mut self, weights: Array1<T>) -> Self {
        self.importance_weights = Some(weights);
        self
    }

    pub fn with_reduction(mut self, reduction: ReductionType) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

impl<T> OrdinalLoss<T> for CoralLoss<T>
where
    T: OrdinalFloat,
{
    fn forward(&self, logits: ArrayView2<'_, T>, labels: ArrayView1<'_, i64>) -> Result<T> {
        let levels = levels_from_labelbatch::<T>(labels, self.num_classes)?;
        coral_loss_with_reduction(
            logits,
            levels.view(),
            self.importance_weights.as_ref().map(|w| w.view()),
            self.reduction,
        )
    }

    fn backward(
        &self,
        logits: ArrayView2<'_, T>,
        labels: ArrayView1<'_, i64>,
    ) -> Result<Array2<T>> {
        let levels = levels_from_labelbatch::<T>(labels, self.num_classes)?;
        coral_loss_grad(
            logits,
            levels.view(),
            self.importance_weights.as_ref().map(|w| w.view()),
            self.reduction,
        )
    }

    fn reduction(&self) -> ReductionType {
        self.reduction
    }
}
