// Numeric backend: the element trait every public operation is generic over.

pub mod number;

pub use number::OrdinalFloat;
