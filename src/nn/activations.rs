// src/nn/activations.rs
// Element-wise logistic activations over whole batches.

use crate::backend::OrdinalFloat;
use ndarray::{Array, ArrayView, Dimension};

/// Applies the stable logistic sigmoid element-wise.
pub fn sigmoid<T, D>(input: ArrayView<'_, T, D>) -> Array<T, D>
where
    T: OrdinalFloat,
    D: Dimension,
{
    input.mapv(T::sigmoid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_sigmoid_over_batch() {
        let logits = array![[0.0f64, 2.0], [-2.0, 50.0]];
        let probas = sigmoid(logits.view());
        assert_eq!(probas.dim(), (2, 2));
        assert_abs_diff_eq!(probas[[0, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(probas[[0, 1]] + probas[[1, 0]], 1.0, epsilon = 1e-12);
        assert!(probas[[1, 1]] <= 1.0);
    }
}
