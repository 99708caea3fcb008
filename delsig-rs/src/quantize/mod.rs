//! Bidirectional canonical-signed-digit quantization.
//!
//! A value is approximated by at most `nsd` signed powers of two, chosen
//! greedily from the most significant end. Each step rounds the remaining
//! residual to the nearest power of two in the log domain, with the
//! threshold at `0.75 * 2^(p+1)`, so terms may overshoot and the next term
//! corrects with the opposite sign.

use core::borrow::Borrow;

use alloc::vec::Vec;
use num_traits::Float;

mod csd;
mod kernels;

pub use csd::*;
pub use kernels::*;

/// `-log2(0.75)`.
const ROUNDING_OFFSET: f64 = 0.415_037_499_278_843_8;

/// Quantize a single value to at most `nsd` signed digits.
///
/// Stops early once `|approx - x| <= abstol` and
/// `|approx - x| <= reltol * |x|`, or when the residual is exactly zero.
/// Non-finite input yields an empty record with `approx = 0`.
pub fn bquantize_value<F: Float>(x: F, nsd: usize, abstol: F, reltol: F) -> QuantizedValue<F> {
    let offset = F::from(ROUNDING_OFFSET).unwrap_or_else(F::zero);

    let mut approx = F::zero();
    let mut residual = x;
    let mut terms = Vec::with_capacity(nsd.min(64));
    for _ in 0..nsd {
        let error = (approx - x).abs();
        if error <= abstol && error <= reltol * x.abs() {
            break;
        }
        if residual.is_zero() {
            break;
        }
        let Some(exponent) = (residual.abs().log2() + offset).floor().to_i32() else {
            break;
        };
        let digit = CsdDigit::new(exponent, Sign::of(residual));
        let term = digit.value::<F>();
        residual = residual - term;
        approx = approx + term;
        terms.push(digit);
    }
    QuantizedValue { approx, terms }
}

/// Quantize each value of `x` to at most `nsd` signed digits.
///
/// Equivalent to the `bquantize` routine of the delta-sigma toolbox; the
/// toolbox defaults are `nsd = 3`, `abstol = eps`, `reltol = 10 * eps`
/// (see [`QuantizeConfig::default`]).
///
/// # Examples
/// ```
/// use delsig_rs::quantize::{bquantize, CsdDigit, Sign};
///
/// let y = bquantize([0.7f64], 3, f64::EPSILON, 10.0 * f64::EPSILON);
/// assert_eq!(y[0].approx, 0.6875);
/// assert_eq!(y[0].terms[2], CsdDigit::new(-4, Sign::Negative));
/// ```
pub fn bquantize<YI, B, F>(x: YI, nsd: usize, abstol: F, reltol: F) -> Vec<QuantizedValue<F>>
where
    F: Float,
    B: Borrow<F>,
    YI: IntoIterator<Item = B>,
{
    x.into_iter()
        .map(|xi| bquantize_value(*xi.borrow(), nsd, abstol, reltol))
        .collect()
}

/// Recover the values encoded by CSD records.
pub fn bunquantize<F: Float>(q: &[QuantizedValue<F>]) -> Vec<F> {
    q.iter().map(QuantizedValue::value_from_terms).collect()
}
