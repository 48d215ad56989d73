// src/nn/losses/corn.rs
// CORN loss: task k only sees the examples whose label is at least k.

use crate::backend::OrdinalFloat;
use crate::dataset::{check_labels, num_tasks};
use crate::error::{OrdinalError, Result};
use crate::nn::losses::{OrdinalLoss, ReductionType, check_logits, log_likelihood};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, trace};

/// CORN loss averaged over the batch size N.
///
/// Task `k` is the binary question "is the label greater than k", asked only
/// of examples with `label >= k`. A task with no such example contributes 0.
/// The summed negative log-likelihood is divided by the full batch size, not
/// by the number of (example, task) pairs that took part.
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::nn::losses::corn_loss;
/// use ndarray::{array, Array2};
///
/// // Task 0 sees all three examples, task 1 only the two with label >= 1.
/// let logits = Array2::<f64>::zeros((3, 2));
/// let loss = corn_loss(logits.view(), array![0, 1, 2].view(), 3).unwrap();
/// assert!((loss - 5.0 * std::f64::consts::LN_2 / 3.0).abs() < 1e-12);
/// ```
pub fn corn_loss<T>(
    logits: ArrayView2<'_, T>,
    labels: ArrayView1<'_, i64>,
    num_classes: usize,
) -> Result<T>
where
    T: OrdinalFloat,
{
    corn_loss_with_reduction(logits, labels, num_classes, ReductionType::Mean)
}

/// CORN loss with an explicit batch reduction.
pub fn corn_loss_with_reduction<T>(
    logits: ArrayView2<'_, T>,
    labels: ArrayView1<'_, i64>,
    num_classes: usize,
    reduction: ReductionType,
) -> Result<T>
where
    T: OrdinalFloat,
{
    check_corn_inputs(&logits, labels, num_classes)?;
    trace!(batch = logits.nrows(), num_classes, "corn loss forward");

    let mut total = T::zero();
    for (task, column) in logits.axis_iter(Axis(1)).enumerate() {
        let threshold = task as i64;
        let mut active = 0usize;
        let mut task_total = T::zero();
        for (&z, &label) in column.iter().zip(labels.iter()) {
            if label < threshold {
                continue;
            }
            active += 1;
            let target = if label > threshold { T::one() } else { T::zero() };
            task_total += log_likelihood(z, target);
        }
        if active == 0 {
            debug!(task, "corn task has an empty conditional subset, skipped");
            continue;
        }
        total += task_total;
    }
    Ok(-total * reduction.scale(logits.nrows()))
}

/// Gradient of the CORN loss with respect to the logits.
///
/// Entries of examples masked out of a task have zero gradient; active ones get
/// `sigmoid(z) - target`, scaled by the reduction.
pub fn corn_loss_grad<T>(
    logits: ArrayView2<'_, T>,
    labels: ArrayView1<'_, i64>,
    num_classes: usize,
    reduction: ReductionType,
) -> Result<Array2<T>>
where
    T: OrdinalFloat,
{
    check_corn_inputs(&logits, labels, num_classes)?;
    let scale: T = reduction.scale(logits.nrows());

    Ok(Array2::from_shape_fn(logits.raw_dim(), |(n, task)| {
        let threshold = task as i64;
        let label = labels[n];
        if label < threshold {
            return T::zero();
        }
        let target = if label > threshold { T::one() } else { T::zero() };
        (logits[[n, task]].sigmoid() - target) * scale
    }))
}

fn check_corn_inputs<T: OrdinalFloat>(
    logits: &ArrayView2<'_, T>,
    labels: ArrayView1<'_, i64>,
    num_classes: usize,
) -> Result<()> {
    let tasks = num_tasks(num_classes)?;
    if logits.ncols() != tasks {
        return Err(OrdinalError::shape(
            "corn_loss logits",
            &[logits.nrows(), tasks],
            logits.shape(),
        ));
    }
    if labels.len() != logits.nrows() {
        return Err(OrdinalError::shape(
            "corn_loss labels",
            &[logits.nrows()],
            labels.shape(),
        ));
    }
    check_logits("corn_loss", logits)?;
    check_labels(labels, num_classes)
}

/// CORN loss bound to a class count.
#[derive(Debug, Clone, Copy)]
pub struct CornLoss {
    num_classes: usize,
    reduction: ReductionType,
}

impl CornLoss {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            reduction: ReductionType::Mean,
        }
    }

    pub fn with_reduction(mut self, reduction: ReductionType) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

impl<T> OrdinalLoss<T> for CornLoss
where
    T: OrdinalFloat,
{
    fn forward(&self, logits: ArrayView2<'_, T>, labels: ArrayView1<'_, i64>) -> Result<T> {
        corn_loss_with_reduction(logits, labels, self.num_classes, self.reduction)
    }

    fn backward(
        &self,
        logits: ArrayView2<'_, T>,
        labels: ArrayView1<'_, i64>,
    ) -> Result<Array2<T>> {
        corn_loss_grad(logits, labels, self.num_classes, self.reduction)
    }

    fn reduction(&self) -> ReductionType {
        self.reduction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    const LN_2: f64 = std::f64::consts::LN_2;

    #[test]
    fn test_conditional_subsets_for_three_classes() {
        // Task 0: all three examples, targets [0, 1, 1].
        // Task 1: labels 1 and 2 only, targets [0, 1].
        let logits = array![[0.5, 9.0], [-0.3, 0.8], [1.1, -0.4]];
        let labels = array![0, 1, 2];
        let loss = corn_loss(logits.view(), labels.view(), 3).unwrap();

        let bce = |z: f64, y: f64| {
            let p = 1.0 / (1.0 + (-z).exp());
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        };
        let task0 = bce(0.5, 0.0) + bce(-0.3, 1.0) + bce(1.1, 1.0);
        // logits[0][1] = 9.0 belongs to a masked example and must not count.
        let task1 = bce(0.8, 0.0) + bce(-0.4, 1.0);
        assert_abs_diff_eq!(loss, (task0 + task1) / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_subsets_contribute_nothing() {
        // Every label is 0: only task 0 has examples.
        let logits = Array2::<f64>::zeros((3, 3));
        let loss = corn_loss(logits.view(), array![0, 0, 0].view(), 4).unwrap();
        assert_abs_diff_eq!(loss, LN_2, epsilon = 1e-12);
    }

    #[test]
    fn test_all_max_labels_keep_every_task_active() {
        // Label K-1 is >= every task index, with target 1 throughout.
        let logits = Array2::<f64>::zeros((2, 4));
        let loss = corn_loss(logits.view(), array![4, 4].view(), 5).unwrap();
        assert_abs_diff_eq!(loss, 4.0 * LN_2, epsilon = 1e-12);
    }

    #[test]
    fn test_sum_reduction_divides_by_nothing() {
        let logits = Array2::<f64>::zeros((3, 2));
        let labels = array![0, 1, 2];
        let summed =
            corn_loss_with_reduction(logits.view(), labels.view(), 3, ReductionType::Sum).unwrap();
        assert_abs_diff_eq!(summed, 5.0 * LN_2, epsilon = 1e-12);
    }

    #[test]
    fn test_approaches_zero_for_confident_correct_logits() {
        // Label 2 of 4: tasks 0 and 1 say "greater", task 2 says "not greater".
        let logits = array![[30.0, 30.0, -30.0]];
        let loss = corn_loss(logits.view(), array![2].view(), 4).unwrap();
        assert!(loss >= 0.0);
        assert_relative_eq!(loss, 3.0 * (-30.0f64).exp().ln_1p(), max_relative = 1e-9);
    }

    #[test]
    fn test_gradient_matches_finite_differences_and_masks() {
        let logits = array![[0.5, 9.0, -1.0], [-0.3, 0.8, 0.2], [1.1, -0.4, 2.5]];
        let labels = array![0, 1, 3];
        let grad = corn_loss_grad(logits.view(), labels.view(), 4, ReductionType::Mean).unwrap();

        // Example 0 (label 0) is outside tasks 1 and 2.
        assert_eq!(grad[[0, 1]], 0.0);
        assert_eq!(grad[[0, 2]], 0.0);
        assert_eq!(grad[[1, 2]], 0.0);

        let eps = 1e-6;
        for idx in [(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)] {
            let mut plus = logits.clone();
            plus[idx] += eps;
            let mut minus = logits.clone();
            minus[idx] -= eps;
            let numeric = (corn_loss(plus.view(), labels.view(), 4).unwrap()
                - corn_loss(minus.view(), labels.view(), 4).unwrap())
                / (2.0 * eps);
            assert_abs_diff_eq!(grad[idx], numeric, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let logits = Array2::<f32>::zeros((2, 2));
        assert!(matches!(
            corn_loss(logits.view(), array![0, 3].view(), 3),
            Err(OrdinalError::InvalidArgument(_))
        ));
        assert!(matches!(
            corn_loss(logits.view(), array![0, -1].view(), 3),
            Err(OrdinalError::InvalidArgument(_))
        ));
        assert!(matches!(
            corn_loss(logits.view(), array![0, 1].view(), 4),
            Err(OrdinalError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            corn_loss(logits.view(), array![0].view(), 3),
            Err(OrdinalError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            corn_loss(logits.view(), array![0, 1].view(), 1),
            Err(OrdinalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_loss_struct_delegates() {
        let loss_fn = CornLoss::new(3).with_reduction(ReductionType::Sum);
        let logits = Array2::<f64>::zeros((3, 2));
        let labels = array![0, 1, 2];
        let loss: f64 = loss_fn.forward(logits.view(), labels.view()).unwrap();
        assert_abs_diff_eq!(loss, 5.0 * LN_2, epsilon = 1e-12);

        let grad: Array2<f64> = loss_fn.backward(logits.view(), labels.view()).unwrap();
        assert_abs_diff_eq!(grad, array![[0.5, 0.0], [-0.5, 0.5], [-0.5, -0.5]], epsilon = 1e-12);
        assert_eq!(OrdinalLoss::<f64>::reduction(&loss_fn), ReductionType::Sum);
        assert_eq!(loss_fn.num_classes(), 3);
    }
}
