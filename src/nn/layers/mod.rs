// src/nn/layers/mod.rs
// Output heads that turn features into K - 1 ordinal logits.

pub mod coral;
pub mod linear;

pub use coral::CoralLayer;
pub use linear::Linear;
