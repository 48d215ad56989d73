// src/metrics.rs
// Evaluation metrics for predicted ordinal labels.

use crate::error::{OrdinalError, Result};
use ndarray::ArrayView1;

/// Ordinal regression metrics comparing decoded predictions to true labels.
pub struct OrdinalMetrics;

impl OrdinalMetrics {
    /// Mean absolute rank distance between predictions and labels.
    ///
    /// # Examples
    /// ```
    /// use coral_ordinal::metrics::OrdinalMetrics;
    /// use ndarray::array;
    ///
    /// let mae = OrdinalMetrics::mean_absolute_error(array![0, 2, 3].view(), array![0, 1, 1].view()).unwrap();
    /// assert!((mae - 1.0).abs() < 1e-12);
    /// ```
    pub fn mean_absolute_error(
        predictions: ArrayView1<'_, usize>,
        labels: ArrayView1<'_, i64>,
    ) -> Result<f64> {
        let distances = Self::distances(predictions, labels)?;
        Ok(distances.iter().sum::<f64>() / distances.len() as f64)
    }

    /// Root mean squared rank distance.
    pub fn root_mean_squared_error(
        predictions: ArrayView1<'_, usize>,
        labels: ArrayView1<'_, i64>,
    ) -> Result<f64> {
        let distances = Self::distances(predictions, labels)?;
        let mse = distances.iter().map(|d| d * d).sum::<f64>() / distances.len() as f64;
        Ok(mse.sqrt())
    }

    /// Fraction of exact matches.
    pub fn accuracy(predictions: ArrayView1<'_, usize>, labels: ArrayView1<'_, i64>) -> Result<f64> {
        let distances = Self::distances(predictions, labels)?;
        let correct = distances.iter().filter(|&&d| d == 0.0).count();
        Ok(correct as f64 / distances.len() as f64)
    }

    fn distances(predictions: ArrayView1<'_, usize>, labels: ArrayView1<'_, i64>) -> Result<Vec<f64>> {
        if predictions.len() != labels.len() {
            return Err(OrdinalError::shape(
                "metrics labels",
                predictions.shape(),
                labels.shape(),
            ));
        }
        if predictions.is_empty() {
            return Err(OrdinalError::invalid("metrics need at least one prediction"));
        }
        Ok(predictions
            .iter()
            .zip(labels.iter())
            .map(|(&p, &y)| (p as f64 - y as f64).abs())
            .collect())
    }
}
