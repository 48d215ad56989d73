// Neural Network Module
// Output heads, ordinal losses and decoders that sit on top of any feature
// extractor producing a (batch, features) matrix.

pub mod activations;
pub mod decode;
pub mod initializers;
pub mod layers;
pub mod losses;
pub mod module;
pub mod optim;
pub mod parameter;

// Re-export the main types and traits for convenience
pub use decode::{
    coral_label_from_logits, corn_cumulative_probabilities, corn_label_from_logits, proba_to_label,
};
pub use layers::{CoralLayer, Linear};
pub use losses::{CoralLoss, CornLoss, OrdinalLoss, ReductionType, coral_loss, corn_loss};
pub use module::Module;
pub use optim::{Optimizer, Sgd};
pub use parameter::Parameter;
