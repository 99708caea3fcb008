//! Frequency query containers and their shape-preserving outputs.

use crate::kernel::ConfigError;
use alloc::{vec, vec::Vec};
use delsig_rs_core::Complex;
use ndarray::{Array, ArrayBase, Data, Dimension};

/// A frequency query whose shape is carried through to the result.
///
/// Implementors flatten themselves into a 1D sequence of frequencies and
/// rebuild an output of the same shape from the evaluated values.
pub trait FrequencyForm<F> {
    /// Result container, shaped like `Self`.
    type Output;

    /// Flatten into evaluation order.
    ///
    /// Fails with [`ConfigError::InvalidShape`] when more than one dimension
    /// is non-trivial.
    fn flatten_query(&self) -> Result<Vec<F>, ConfigError>;

    /// Rebuild an output of this query's shape from flattened values.
    fn restore(&self, values: Vec<Complex<F>>) -> Result<Self::Output, ConfigError>;
}

const SHAPE_REASON: &str = "frequency query must have at most one non-trivial dimension";

/// `true` when every axis but (at most) one has length 1.
pub(crate) fn collapses_to_one_dim(shape: &[usize]) -> bool {
    let product: usize = shape.iter().product();
    let largest = shape.iter().copied().max().unwrap_or(1);
    product == largest
}

fn check_restore_len(expected: usize, got: usize) -> Result<(), ConfigError> {
    if expected != got {
        return Err(ConfigError::LengthMismatch {
            arg: "values",
            expected,
            got,
        });
    }
    Ok(())
}

macro_rules! scalar_frequency_form {
    ($($t:ty),*) => {
        $(
            impl FrequencyForm<$t> for $t {
                type Output = Complex<$t>;

                fn flatten_query(&self) -> Result<Vec<$t>, ConfigError> {
                    Ok(vec![*self])
                }

                fn restore(&self, values: Vec<Complex<$t>>) -> Result<Complex<$t>, ConfigError> {
                    check_restore_len(1, values.len())?;
                    Ok(values[0])
                }
            }
        )*
    };
}

scalar_frequency_form!(f32, f64);

impl<F: Copy> FrequencyForm<F> for [F] {
    type Output = Vec<Complex<F>>;

    fn flatten_query(&self) -> Result<Vec<F>, ConfigError> {
        Ok(self.to_vec())
    }

    fn restore(&self, values: Vec<Complex<F>>) -> Result<Self::Output, ConfigError> {
        check_restore_len(self.len(), values.len())?;
        Ok(values)
    }
}

impl<F: Copy> FrequencyForm<F> for Vec<F> {
    type Output = Vec<Complex<F>>;

    fn flatten_query(&self) -> Result<Vec<F>, ConfigError> {
        self.as_slice().flatten_query()
    }

    fn restore(&self, values: Vec<Complex<F>>) -> Result<Self::Output, ConfigError> {
        self.as_slice().restore(values)
    }
}

impl<F: Copy, const N: usize> FrequencyForm<F> for [F; N] {
    type Output = [Complex<F>; N];

    fn flatten_query(&self) -> Result<Vec<F>, ConfigError> {
        Ok(self.to_vec())
    }

    fn restore(&self, values: Vec<Complex<F>>) -> Result<Self::Output, ConfigError> {
        let got = values.len();
        values
            .try_into()
            .map_err(|_| ConfigError::LengthMismatch {
                arg: "values",
                expected: N,
                got,
            })
    }
}

impl<F, S, D> FrequencyForm<F> for ArrayBase<S, D>
where
    F: Copy,
    S: Data<Elem = F>,
    D: Dimension,
{
    type Output = Array<Complex<F>, D>;

    fn flatten_query(&self) -> Result<Vec<F>, ConfigError> {
        if !collapses_to_one_dim(self.shape()) {
            return Err(ConfigError::InvalidShape {
                arg: "f",
                reason: SHAPE_REASON,
            });
        }
        Ok(self.iter().copied().collect())
    }

    fn restore(&self, values: Vec<Complex<F>>) -> Result<Self::Output, ConfigError> {
        check_restore_len(self.len(), values.len())?;
        let got = values.len();
        Array::from_shape_vec(self.raw_dim(), values).map_err(|_| ConfigError::LengthMismatch {
            arg: "values",
            expected: self.len(),
            got,
        })
    }
}
