use crate::backend::OrdinalFloat;
use crate::error::{OrdinalError, Result};
use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Xavier/Glorot uniform initialization
/// Samples from a uniform distribution U(-a, a) where a = gain * sqrt(6 / (fan_in + fan_out))
pub fn xavier_uniform<T, R>(
    shape: &[usize],
    fan_in: usize,
    fan_out: usize,
    gain: f64,
    rng: &mut R,
) -> Result<ArrayD<T>>
where
    T: OrdinalFloat,
    R: Rng + ?Sized,
{
    if fan_in + fan_out == 0 {
        return Err(OrdinalError::invalid("xavier_uniform needs fan_in + fan_out > 0"));
    }
    let a = gain * (6.0 / (fan_in + fan_out) as f64).sqrt();
    let uniform = Uniform::new_inclusive(-a, a)
        .map_err(|e| OrdinalError::invalid(format!("xavier_uniform bound {}: {}", a, e)))?;

    Ok(ArrayD::from_shape_fn(IxDyn(shape), |_| {
        T::from_f64_lossy(uniform.sample(&mut *rng))
    }))
}
