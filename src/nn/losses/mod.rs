pub mod coral;
pub mod corn;

use crate::backend::OrdinalFloat;
use crate::error::{OrdinalError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};

pub use coral::{
    CoralLoss, coral_loss, coral_loss_grad, coral_loss_per_sample, coral_loss_with_reduction,
};
pub use corn::{CornLoss, corn_loss, corn_loss_grad, corn_loss_with_reduction};

/// Common interface of the ordinal losses.
///
/// Both losses are driven by raw integer labels here; CORAL encodes them into
/// levels internally. `backward` returns `dL/d(logits)` shaped like the logits,
/// ready for `Module::backward`.
pub trait OrdinalLoss<T>
where
    T: OrdinalFloat,
{
    /// Scalar loss for a batch of `(N, K - 1)` logits and `N` labels.
    fn forward(&self, logits: ArrayView2<'_, T>, labels: ArrayView1<'_, i64>) -> Result<T>;

    /// Gradient of `forward` with respect to the logits.
    fn backward(&self, logits: ArrayView2<'_, T>, labels: ArrayView1<'_, i64>)
    -> Result<Array2<T>>;

    fn reduction(&self) -> ReductionType {
        ReductionType::Mean
    }
}

/// Loss reduction strategies - determines how batch losses are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionType {
    /// Sum of per-example losses divided by the batch size N
    #[default]
    Mean,
    /// Sum all losses in batch
    Sum,
}

impl ReductionType {
    /// Factor applied to the summed negative log-likelihood.
    pub(crate) fn scale<T: OrdinalFloat>(self, batch_size: usize) -> T {
        match self {
            ReductionType::Mean => T::one() / T::from_count(batch_size),
            ReductionType::Sum => T::one(),
        }
    }
}

/// Rejects empty batches and logits with no threshold column.
pub(crate) fn check_logits<T: OrdinalFloat>(
    context: &'static str,
    logits: &ArrayView2<'_, T>,
) -> Result<()> {
    if logits.nrows() == 0 {
        return Err(OrdinalError::invalid(format!("{}: empty batch", context)));
    }
    if logits.ncols() == 0 {
        return Err(OrdinalError::invalid(format!(
            "{}: logits need at least one threshold column (num_classes >= 2)",
            context
        )));
    }
    Ok(())
}

/// Binary cross-entropy log-likelihood of one logit:
/// `log_sigmoid(z) * y + (log_sigmoid(z) - z) * (1 - y)`.
///
/// `log_sigmoid(z) - z` is evaluated as `log_sigmoid(-z)`, which is the same
/// value without cancellation when `z` is large and negative.
#[inline]
pub(crate) fn log_likelihood<T: OrdinalFloat>(logit: T, target: T) -> T {
    logit.log_sigmoid() * target + (-logit).log_sigmoid() * (T::one() - target)
}
