// src/config.rs
// Explicit configuration for the CORAL output head.

use crate::dataset::num_tasks;
use crate::error::{OrdinalError, Result};

/// Configuration for a `CoralLayer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoralLayerConfig {
    /// Size of the feature vector fed into the head
    pub in_features: usize,
    /// Number of ordinal classes K; the head emits K - 1 logits
    pub num_classes: usize,
    /// Start biases at `[K-1, ..., 1] / (K-1)` instead of zeros
    pub preinit_bias: bool,
}

impl CoralLayerConfig {
    pub fn new(in_features: usize, num_classes: usize) -> Self {
        Self {
            in_features,
            num_classes,
            preinit_bias: true,
        }
    }

    pub fn with_preinit_bias(mut self, preinit_bias: bool) -> Self {
        self.preinit_bias = preinit_bias;
        self
    }

    /// Number of logits the head produces.
    pub fn num_tasks(&self) -> Result<usize> {
        num_tasks(self.num_classes)
    }

    pub fn validate(&self) -> Result<()> {
        if self.in_features == 0 {
            return Err(OrdinalError::invalid("in_features must be positive"));
        }
        self.num_tasks().map(|_| ())
    }
}
