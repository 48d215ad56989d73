// src/dataset/levels.rs
// Extended binary ("levels") encoding of ordinal labels and CORAL task weights.

use crate::backend::OrdinalFloat;
use crate::error::{OrdinalError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use tracing::trace;

/// Number of binary sub-tasks (`K - 1`) for `num_classes` ordinal classes.
///
/// Fails with `InvalidArgument` when fewer than two classes are requested,
/// since no threshold exists to learn.
pub fn num_tasks(num_classes: usize) -> Result<usize> {
    if num_classes < 2 {
        return Err(OrdinalError::invalid(format!(
            "num_classes must be at least 2, got {}",
            num_classes
        )));
    }
    Ok(num_classes - 1)
}

/// Checks every label lies in `[0, num_classes - 1]`.
pub fn check_labels(labels: ArrayView1<'_, i64>, num_classes: usize) -> Result<()> {
    let upper = num_classes as i64;
    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|&(_, &label)| label < 0 || label >= upper)
    {
        return Err(OrdinalError::invalid(format!(
            "label {} at position {} is outside [0, {}]",
            label,
            index,
            upper - 1
        )));
    }
    Ok(())
}

/// Encodes a single label as a `K - 1` vector whose entry `i` is 1 iff `label > i`.
pub fn label_to_levels<T>(label: i64, num_classes: usize) -> Result<Array1<T>>
where
    T: OrdinalFloat,
{
    let tasks = num_tasks(num_classes)?;
    check_labels(ArrayView1::from(&[label][..]), num_classes)?;
    Ok(Array1::from_shape_fn(tasks, |i| level_bit(label, i)))
}

/// Encodes a batch of `N` labels into an `(N, K - 1)` matrix of levels.
///
/// Row `n` holds `labels[n]` ones followed by `K - 1 - labels[n]` zeros.
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::dataset::levels_from_labelbatch;
/// use ndarray::array;
///
/// let levels = levels_from_labelbatch::<f32>(array![3, 0].view(), 5).unwrap();
/// assert_eq!(levels, array![[1.0, 1.0, 1.0, 0.0], [0.0, 0.0, 0.0, 0.0]]);
/// ```
pub fn levels_from_labelbatch<T>(labels: ArrayView1<'_, i64>, num_classes: usize) -> Result<Array2<T>>
where
    T: OrdinalFloat,
{
    let tasks = num_tasks(num_classes)?;
    check_labels(labels, num_classes)?;
    trace!(batch = labels.len(), num_classes, "encoding label batch into levels");

    Ok(Array2::from_shape_fn((labels.len(), tasks), |(n, i)| {
        level_bit(labels[n], i)
    }))
}

/// Per-task importance weights for `coral_loss`.
///
/// For task `k`, `m_k = sqrt(max(|{y > k}|, N - |{y > k}|))`; the weights are
/// `m / max(m)` so the most imbalanced task gets weight 1.
pub fn task_importance_weights<T>(labels: ArrayView1<'_, i64>, num_classes: usize) -> Result<Array1<T>>
where
    T: OrdinalFloat,
{
    let tasks = num_tasks(num_classes)?;
    check_labels(labels, num_classes)?;
    if labels.is_empty() {
        return Err(OrdinalError::invalid(
            "cannot derive task importance weights from an empty label batch",
        ));
    }

    let total = labels.len();
    let raw = Array1::from_shape_fn(tasks, |k| {
        let above = labels.iter().filter(|&&label| label > k as i64).count();
        T::from_count(above.max(total - above)).sqrt()
    });
    // Non-empty batch, so every m_k >= sqrt(N / 2) > 0.
    let largest = raw.iter().copied().fold(T::zero(), T::max);
    Ok(raw.mapv(|m| m / largest))
}

#[inline]
fn level_bit<T: OrdinalFloat>(label: i64, task: usize) -> T {
    if label > task as i64 { T::one() } else { T::zero() }
}
