// src/backend/number.rs
// Floating point element trait shared by every encoder, loss, decoder and layer.
// Stable logistic primitives live here so the loss code never calls exp/ln directly.

use ndarray::{LinalgScalar, ScalarOperand};
use num_traits::Float;
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{AddAssign, MulAssign, SubAssign};

/// Element type accepted by the ordinal toolkit.
///
/// Implemented for `f32` and `f64`. Besides the arithmetic required by ndarray,
/// it provides the numerically stable logistic helpers the CORAL and CORN
/// losses are written in terms of.
pub trait OrdinalFloat:
    Float
    + LinalgScalar
    + ScalarOperand
    + AddAssign
    + SubAssign
    + MulAssign
    + Sum<Self>
    + for<'a> Sum<&'a Self>
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + 'static
{
    /// Converts from f64, rounding to the nearest representable value.
    fn from_f64_lossy(value: f64) -> Self;

    /// Converts a count (batch size, number of tasks) to this type.
    fn from_count(count: usize) -> Self;

    /// The decision threshold used when decoding probabilities.
    fn half() -> Self {
        Self::from_f64_lossy(0.5)
    }

    /// Logistic sigmoid `1 / (1 + exp(-x))`.
    ///
    /// Branches on the sign of `x` so `exp` is only ever evaluated on a
    /// non-positive argument and cannot overflow.
    fn sigmoid(self) -> Self {
        if self >= Self::zero() {
            Self::one() / (Self::one() + (-self).exp())
        } else {
            let e = self.exp();
            e / (Self::one() + e)
        }
    }

    /// `ln(1 + exp(x))` computed as `max(x, 0) + ln1p(exp(-|x|))`.
    fn softplus(self) -> Self {
        self.max(Self::zero()) + (-self.abs()).exp().ln_1p()
    }

    /// `ln(sigmoid(x))`, equal to `-softplus(-x)`.
    fn log_sigmoid(self) -> Self {
        -(-self).softplus()
    }
}

impl OrdinalFloat for f64 {
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    fn from_count(count: usize) -> Self {
        count as f64
    }
}

impl OrdinalFloat for f32 {
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    fn from_count(count: usize) -> Self {
        count as f32
    }
}
