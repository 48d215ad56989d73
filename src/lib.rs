//! # coral-ordinal
//!
//! Ordinal regression heads for neural networks, written on top of `ndarray`.
//!
//! A K-class ordinal problem is recast as K - 1 binary "is the label greater
//! than threshold i" tasks. Two frameworks are provided:
//!
//! - **CORAL**: every example trains every threshold; a `CoralLayer` shares one
//!   weight vector across thresholds so predictions are rank consistent.
//! - **CORN**: threshold i is trained only on examples with label >= i, and
//!   predictions chain the conditional probabilities.
//!
//! ## Features
//!
//! - Label encoding into extended binary levels (`dataset`)
//! - Numerically stable CORAL and CORN losses with analytic gradients (`nn::losses`)
//! - Probability and logit decoders (`nn::decode`)
//! - `CoralLayer` and `Linear` heads with backward passes, plus SGD (`nn`)
//! - MAE / RMSE metrics over predicted ranks (`metrics`)
//!
//! ```rust
//! use coral_ordinal::dataset::levels_from_labelbatch;
//! use coral_ordinal::nn::{coral_loss, proba_to_label};
//! use coral_ordinal::nn::activations::sigmoid;
//! use ndarray::array;
//!
//! let levels = levels_from_labelbatch::<f64>(array![3].view(), 5).unwrap();
//! let logits = array![[10.0, 10.0, 10.0, -10.0]];
//! assert!(coral_loss(logits.view(), levels.view(), None).unwrap() < 1e-3);
//! assert_eq!(proba_to_label(sigmoid(logits.view()).view()), array![3]);
//! ```

pub mod backend;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod nn;

// Re-export commonly used types for convenience
pub use backend::OrdinalFloat;
pub use config::CoralLayerConfig;
pub use error::{OrdinalError, Result};
