// src/nn/decode.rs
// Turning threshold probabilities or logits back into ordinal class indices.

use crate::backend::OrdinalFloat;
use crate::nn::activations::sigmoid;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Predicted label = number of thresholds whose probability exceeds 0.5.
///
/// Works on any `(N, K - 1)` probability matrix, monotone or not: it counts
/// exceeded thresholds rather than looking for the first one that fails.
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::nn::decode::proba_to_label;
/// use ndarray::array;
///
/// let probas = array![[0.9, 0.8, 0.3, 0.1], [0.9, 0.2, 0.7, 0.1]];
/// assert_eq!(proba_to_label(probas.view()), array![2, 2]);
/// ```
pub fn proba_to_label<T>(probas: ArrayView2<'_, T>) -> Array1<usize>
where
    T: OrdinalFloat,
{
    let half = T::half();
    probas.map_axis(Axis(1), |row| row.iter().filter(|&&p| p > half).count())
}

/// CORAL decoding straight from logits: sigmoid, then `proba_to_label`.
pub fn coral_label_from_logits<T>(logits: ArrayView2<'_, T>) -> Array1<usize>
where
    T: OrdinalFloat,
{
    proba_to_label(sigmoid(logits).view())
}

/// Unconditional exceedance probabilities from CORN logits.
///
/// Column `i` holds `P(label > i) = prod_{j <= i} sigmoid(logit_j)`, the chain
/// rule over the conditional probabilities the CORN head predicts. Each row
/// is non-increasing by construction.
pub fn corn_cumulative_probabilities<T>(logits: ArrayView2<'_, T>) -> Array2<T>
where
    T: OrdinalFloat,
{
    let mut probas = sigmoid(logits);
    probas.accumulate_axis_inplace(Axis(1), |&prev, curr| *curr = *curr * prev);
    probas
}

/// CORN decoding: count thresholds whose cumulative probability exceeds 0.5.
///
/// # Examples
///
/// ```rust
/// use coral_ordinal::nn::decode::corn_label_from_logits;
/// use ndarray::array;
///
/// // sigmoid(2) = 0.881; 0.881 * sigmoid(0.5) = 0.548; 0.548 * 0.881 = 0.483
/// let logits = array![[2.0, 0.5, 2.0]];
/// assert_eq!(corn_label_from_logits(logits.view()), array![2]);
/// ```
pub fn corn_label_from_logits<T>(logits: ArrayView2<'_, T>) -> Array1<usize>
where
    T: OrdinalFloat,
{
    proba_to_label(corn_cumulative_probabilities(logits).view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::levels_from_labelbatch;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_proba_to_label_counts_exceeded_thresholds() {
        let probas = array![[0.9, 0.8, 0.3, 0.1], [0.1, 0.1, 0.1, 0.1], [0.6, 0.6, 0.6, 0.6]];
        assert_eq!(proba_to_label(probas.view()), array![2, 0, 4]);
    }

    #[test]
    fn test_proba_to_label_tolerates_non_monotone_rows() {
        let probas = array![[0.9f32, 0.2, 0.7]];
        assert_eq!(proba_to_label(probas.view()), array![2]);
    }

    #[test]
    fn test_exactly_half_is_not_exceeded() {
        let probas = array![[0.5, 0.5]];
        assert_eq!(proba_to_label(probas.view()), array![0]);
    }

    #[test]
    fn test_round_trip_from_levels() {
        for num_classes in 2..=10usize {
            let labels: Array1<i64> = (0..num_classes as i64).collect();
            let levels = levels_from_labelbatch::<f64>(labels.view(), num_classes).unwrap();
            let decoded = proba_to_label(levels.view());
            let expected: Array1<usize> = (0..num_classes).collect();
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn test_monotone_in_probabilities() {
        let base = array![[0.7, 0.45, 0.2, 0.05]];
        let mut previous = proba_to_label(base.view())[0];
        for step in 1..=10 {
            let raised = base.mapv(|p| (p + 0.06 * step as f64).min(1.0));
            let label = proba_to_label(raised.view())[0];
            assert!(label >= previous);
            previous = label;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn test_confident_coral_logits_decode_to_label() {
        let logits = array![[10.0, 10.0, 10.0, -10.0]];
        assert_eq!(coral_label_from_logits(logits.view()), array![3]);
    }

    #[test]
    fn test_corn_cumulative_probabilities_are_products() {
        let logits = array![[2.0, 0.5, 2.0]];
        let probas = corn_cumulative_probabilities(logits.view());
        let s = |z: f64| 1.0 / (1.0 + (-z).exp());
        assert_abs_diff_eq!(probas[[0, 0]], s(2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(probas[[0, 1]], s(2.0) * s(0.5), epsilon = 1e-12);
        assert_abs_diff_eq!(probas[[0, 2]], s(2.0) * s(0.5) * s(2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_corn_decoding_differs_from_independent_thresholds() {
        let logits = array![[2.0, 0.5, 2.0], [2.0, 2.0, 2.0], [-1.0, 5.0, 5.0]];
        // Thresholds read independently versus chained into P(label > i).
        assert_eq!(coral_label_from_logits(logits.view()), array![3, 3, 2]);
        assert_eq!(corn_label_from_logits(logits.view()), array![2, 3, 0]);
    }

    #[test]
    fn test_corn_labels_stay_in_range() {
        let logits = Array2::from_shape_fn((6, 4), |(i, j)| (i as f64 - 2.0) * 40.0 + j as f64);
        let labels = corn_label_from_logits(logits.view());
        assert!(labels.iter().all(|&l| l <= 4));
        assert_eq!(labels[0], 0);
        assert_eq!(labels[5], 4);
    }
}
