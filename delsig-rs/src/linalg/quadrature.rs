use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
use core::ops::Neg;
use nalgebra::{Complex, DMatrix, Scalar};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

/// Complex-to-real matrix mapping capability.
pub trait QuadratureRealMap<T> {
    /// Output matrix type.
    type Output;

    /// Map a complex `R x C` matrix to its real `2R x 2C` equivalent.
    fn run(&self, m: &DMatrix<Complex<T>>) -> Result<Self::Output, ExecInvariantViolation>;
}

/// Constructor config for [`QuadratureMapKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadratureMapConfig {
    /// Optional expected `(rows, cols)` of the complex input.
    pub expected_shape: Option<(usize, usize)>,
}

/// Trait-first quadrature-to-real mapping kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadratureMapKernel {
    expected_shape: Option<(usize, usize)>,
}

impl QuadratureMapKernel {
    /// Configured input shape, if any.
    pub fn expected_shape(&self) -> Option<(usize, usize)> {
        self.expected_shape
    }
}

impl KernelLifecycle for QuadratureMapKernel {
    type Config = QuadratureMapConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        debug!(expected_shape = ?config.expected_shape, "quadrature map kernel configured");
        Ok(Self {
            expected_shape: config.expected_shape,
        })
    }
}

impl<T> QuadratureRealMap<T> for QuadratureMapKernel
where
    T: Scalar + Copy + Neg<Output = T>,
{
    type Output = DMatrix<T>;

    fn run(&self, m: &DMatrix<Complex<T>>) -> Result<Self::Output, ExecInvariantViolation> {
        if let Some((rows, cols)) = self.expected_shape {
            if m.nrows() != rows {
                return Err(ExecInvariantViolation::LengthMismatch {
                    arg: "rows",
                    expected: rows,
                    got: m.nrows(),
                });
            }
            if m.ncols() != cols {
                return Err(ExecInvariantViolation::LengthMismatch {
                    arg: "cols",
                    expected: cols,
                    got: m.ncols(),
                });
            }
        }
        Ok(map_q_to_r(m))
    }
}

/// Real block for one complex entry at offset `(r % 2, c % 2)`.
///
/// `x + iy` becomes `[[x, -y], [y, x]]`.
#[inline]
fn block_entry<T: Copy + Neg<Output = T>>(q: Complex<T>, r: usize, c: usize) -> T {
    match (r % 2, c % 2) {
        (0, 1) => -q.im,
        (1, 0) => q.im,
        _ => q.re,
    }
}

/// Map a quadrature (complex) state-space matrix to a real one.
///
/// Each entry `x + iy` of the `R x C` input expands into the 2x2 block
/// `[[x, -y], [y, x]]` at rows `2i, 2i+1` and columns `2j, 2j+1`, so a
/// real system driven by interleaved `(re, im)` pairs behaves like the
/// complex one. Empty inputs produce correctly sized empty outputs.
pub fn map_q_to_r<T>(m: &DMatrix<Complex<T>>) -> DMatrix<T>
where
    T: Scalar + Copy + Neg<Output = T>,
{
    let (rows, cols) = m.shape();
    DMatrix::from_fn(2 * rows, 2 * cols, |r, c| {
        block_entry(m[(r / 2, c / 2)], r, c)
    })
}

/// [`map_q_to_r`] for ndarray inputs.
pub fn map_q_to_r_array<T>(m: ArrayView2<'_, Complex<T>>) -> Array2<T>
where
    T: Copy + Neg<Output = T>,
{
    let (rows, cols) = m.dim();
    Array2::from_shape_fn((2 * rows, 2 * cols), |(r, c)| {
        block_entry(m[[r / 2, c / 2]], r, c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// 6x7 matrix with `A[i][j] = 1 + i + 6j`, as `arange(1, 43).reshape(7, 6).T`.
    fn column_major_ramp() -> DMatrix<f64> {
        DMatrix::from_fn(6, 7, |i, j| (1 + i + 6 * j) as f64)
    }

    #[test]
    fn ramp_matrix_maps_to_blocks() {
        let a = column_major_ramp();
        let m = a.map(|x| Complex::new(x, x));
        let r = map_q_to_r(&m);
        assert_eq!(r.shape(), (12, 14));

        let row0: Vec<f64> = r.row(0).iter().copied().collect();
        assert_eq!(
            row0,
            vec![
                1., -1., 7., -7., 13., -13., 19., -19., 25., -25., 31., -31., 37., -37.
            ]
        );
        let row1: Vec<f64> = r.row(1).iter().copied().collect();
        assert_eq!(
            row1,
            vec![1., 1., 7., 7., 13., 13., 19., 19., 25., 25., 31., 31., 37., 37.]
        );

        for i in 0..6 {
            for j in 0..7 {
                let x = a[(i, j)];
                assert_eq!(r[(2 * i, 2 * j)], x);
                assert_eq!(r[(2 * i, 2 * j + 1)], -x);
                assert_eq!(r[(2 * i + 1, 2 * j)], x);
                assert_eq!(r[(2 * i + 1, 2 * j + 1)], x);
            }
        }
    }

    #[test]
    fn sub_blocks_hold_real_and_imaginary_parts() {
        let mut rng = rand::rng();
        let rows = rng.random_range(1..6);
        let cols = rng.random_range(1..6);
        let m = DMatrix::from_fn(rows, cols, |_, _| {
            Complex::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0))
        });
        let r = map_q_to_r(&m);
        assert_eq!(r.shape(), (2 * rows, 2 * cols));
        for i in 0..rows {
            for j in 0..cols {
                let q = m[(i, j)];
                assert_eq!(r[(2 * i, 2 * j)], q.re);
                assert_eq!(r[(2 * i + 1, 2 * j + 1)], q.re);
                assert_eq!(r[(2 * i, 2 * j + 1)], -q.im);
                assert_eq!(r[(2 * i + 1, 2 * j)], q.im);
            }
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let m = DMatrix::<Complex<f64>>::zeros(0, 3);
        assert_eq!(map_q_to_r(&m).shape(), (0, 6));
        let m = DMatrix::<Complex<f32>>::zeros(2, 0);
        assert_eq!(map_q_to_r(&m).shape(), (4, 0));
        let a = Array2::<Complex<f64>>::from_elem((0, 0), Complex::new(0.0, 0.0));
        assert_eq!(map_q_to_r_array(a.view()).dim(), (0, 0));
    }

    #[test]
    fn ndarray_matches_nalgebra() {
        let m = DMatrix::from_fn(3, 2, |i, j| Complex::new(i as f64 - 1.0, 0.5 * j as f64 + 0.25));
        let a = Array2::from_shape_fn((3, 2), |(i, j)| m[(i, j)]);
        let expected = map_q_to_r(&m);
        let actual = map_q_to_r_array(a.view());
        assert_eq!(actual.dim(), (6, 4));
        for r in 0..6 {
            for c in 0..4 {
                assert_eq!(actual[[r, c]], expected[(r, c)]);
            }
        }
    }

    #[test]
    fn kernel_matches_function_and_checks_shape() {
        let m = DMatrix::from_fn(2, 3, |i, j| Complex::new(i as f64, j as f64));
        let kernel = QuadratureMapKernel::try_new(QuadratureMapConfig {
            expected_shape: Some((2, 3)),
        })
        .expect("kernel should initialize");
        assert_eq!(kernel.run(&m).expect("kernel should run"), map_q_to_r(&m));

        let transposed = m.transpose();
        let err = kernel.run(&transposed).expect_err("shape mismatch");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "rows",
                expected: 2,
                got: 3
            }
        );

        let any_shape = QuadratureMapKernel::try_new(QuadratureMapConfig::default())
            .expect("unconstrained kernel");
        assert_eq!(any_shape.expected_shape(), None);
        assert_eq!(any_shape.run(&transposed).expect("any shape").shape(), (6, 4));
    }
}
