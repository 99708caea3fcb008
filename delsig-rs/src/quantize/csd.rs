//! Canonical-signed-digit terms and quantized records.

use alloc::vec::Vec;
use num_traits::Float;

/// Sign of a single canonical-signed-digit term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// `+2^p`.
    Positive,
    /// `-2^p`.
    Negative,
}

impl Sign {
    /// Sign of a non-zero value; negative values map to [`Sign::Negative`].
    pub fn of<F: Float>(value: F) -> Self {
        if value < F::zero() {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    /// `+1` or `-1` as an integer.
    pub fn as_i8(self) -> i8 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }

    fn apply<F: Float>(self, magnitude: F) -> F {
        match self {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        }
    }
}

/// One signed power-of-two term, `sign * 2^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CsdDigit {
    /// Power of two.
    pub exponent: i32,
    /// Sign of the term.
    pub sign: Sign,
}

impl CsdDigit {
    /// Build a term.
    pub fn new(exponent: i32, sign: Sign) -> Self {
        Self { exponent, sign }
    }

    /// `sign * 2^exponent`.
    pub fn value<F: Float>(&self) -> F {
        let magnitude = F::from(self.exponent).map_or(F::zero(), F::exp2);
        self.sign.apply(magnitude)
    }
}

/// A value quantized to a bounded number of signed digits.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedValue<F> {
    /// Quantized value, the in-order sum of `terms`.
    pub approx: F,
    /// Terms, most significant first.
    pub terms: Vec<CsdDigit>,
}

impl<F: Float> QuantizedValue<F> {
    /// Sum the terms in order, starting from zero.
    pub fn value_from_terms(&self) -> F {
        self.terms
            .iter()
            .fold(F::zero(), |acc, digit| acc + digit.value::<F>())
    }

    /// Number of signed digits used.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// `true` when no digit was needed.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
