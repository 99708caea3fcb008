//! Product of a continuous-time and a discrete-time transfer function.
//!
//! Computes `H(f) = Hs(j2πf) * Hz(exp(j2πf))` for a frequency `f` normalized
//! to the sample rate. When `s = j2πf` lands on a pole of `Hs`, the
//! coincident zeros of `Hz` are cancelled against it analytically instead of
//! producing `0/0`.
//!
//! Tolerances for "lands on" are derived from machine epsilon and the number
//! of roots involved: `lim(n) = min(1e-3, max(1e-5, eps^(1/(1+n))))`.

use crate::kernel::{ExecInvariantViolation, KernelLifecycle};
use crate::signal::traits::TfpEvaluate1D;
use delsig_rs_core::zpk::{eval_rpoly, Zpk};
use delsig_rs_core::Complex;
use num_traits::{Float, FloatConst, Zero};

mod form;
mod kernels;

pub use form::*;
pub use kernels::*;

/// Distances under which a root is considered to coincide with the
/// evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CancellationTolerance<F> {
    /// Distance in the `s`-plane, compared against the poles of `Hs`.
    pub s_lim: F,
    /// Distance in the `z`-plane, compared against the zeros of `Hz`.
    pub z_lim: F,
}

impl<F: Float> CancellationTolerance<F> {
    /// Tolerance for a polynomial with `roots` roots.
    pub fn limit(roots: usize) -> F {
        let ceiling = constant::<F>(1e-3);
        let floor = constant::<F>(1e-5);
        let exponent = F::from(roots + 1).map_or(F::zero(), F::recip);
        ceiling.min(floor.max(F::epsilon().powf(exponent)))
    }

    /// Tolerances for the pole count of `hs` and the zero count of `hz`.
    pub fn for_roots(hs: &Zpk<F>, hz: &Zpk<F>) -> Self {
        Self {
            s_lim: Self::limit(hs.poles.len()),
            z_lim: Self::limit(hz.zeros.len()),
        }
    }
}

fn constant<F: Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::epsilon)
}

/// Evaluation branch taken at a single frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// No pole of `Hs` at `s`; plain product.
    Direct,
    /// More coincident zeros of `Hz` than poles of `Hs`: the product is `0`.
    ZeroSentinel {
        /// Coincident poles of `Hs`.
        poles: usize,
        /// Coincident zeros of `Hz`.
        zeros: usize,
    },
    /// Fewer coincident zeros of `Hz` than poles of `Hs`: the product is `+inf`.
    InfinitySentinel {
        /// Coincident poles of `Hs`.
        poles: usize,
        /// Coincident zeros of `Hz`.
        zeros: usize,
    },
    /// Equal counts; `order` pole/zero pairs are removed analytically.
    Exact {
        /// Number of cancelled pairs.
        order: usize,
    },
}

impl Cancellation {
    /// Classify the evaluation point `(s, z)` for the pair `hs`, `hz`.
    pub fn detect<F: Float>(
        hs: &Zpk<F>,
        hz: &Zpk<F>,
        tol: &CancellationTolerance<F>,
        s: Complex<F>,
        z: Complex<F>,
    ) -> Self {
        let poles = coincident(&hs.poles, s, tol.s_lim).count();
        if poles == 0 {
            return Cancellation::Direct;
        }
        let zeros = coincident(&hz.zeros, z, tol.z_lim).count();
        match zeros.cmp(&poles) {
            core::cmp::Ordering::Greater => Cancellation::ZeroSentinel { poles, zeros },
            core::cmp::Ordering::Less => Cancellation::InfinitySentinel { poles, zeros },
            core::cmp::Ordering::Equal => Cancellation::Exact { order: poles },
        }
    }
}

fn is_near<F: Float>(root: &Complex<F>, x: Complex<F>, lim: F) -> bool {
    (x - *root).norm() < lim
}

fn coincident<'a, F: Float>(
    roots: &'a [Complex<F>],
    x: Complex<F>,
    lim: F,
) -> impl Iterator<Item = &'a Complex<F>> + 'a {
    roots.iter().filter(move |r| is_near(r, x, lim))
}

fn remaining<'a, F: Float>(
    roots: &'a [Complex<F>],
    x: Complex<F>,
    lim: F,
) -> impl Iterator<Item = &'a Complex<F>> + 'a {
    roots.iter().filter(move |r| !is_near(r, x, lim))
}

/// `s = j2πf` and `z = exp(s)`.
pub(crate) fn frequency_point<F: Float + FloatConst>(f: F) -> (Complex<F>, Complex<F>) {
    let w = (F::PI() + F::PI()) * f;
    let s = Complex::new(F::zero(), w);
    (s, Complex::new(w.cos(), w.sin()))
}

pub(crate) fn evaluate_point<F: Float>(
    hs: &Zpk<F>,
    hz: &Zpk<F>,
    tol: &CancellationTolerance<F>,
    s: Complex<F>,
    z: Complex<F>,
    case: Cancellation,
) -> Complex<F> {
    match case {
        Cancellation::Direct => hs.eval(s) * hz.eval(z),
        Cancellation::ZeroSentinel { .. } => Complex::zero(),
        Cancellation::InfinitySentinel { .. } => Complex::new(F::infinity(), F::zero()),
        Cancellation::Exact { order } => {
            let zpow = (0..order).fold(Complex::new(F::one(), F::zero()), |acc, _| acc * z);
            let num = eval_rpoly(hs.zeros.iter(), s, hs.gain)
                * zpow
                * eval_rpoly(remaining(&hz.zeros, z, tol.z_lim), z, hz.gain);
            let den = eval_rpoly(remaining(&hs.poles, s, tol.s_lim), s, F::one())
                * eval_rpoly(hz.poles.iter(), z, F::one());
            num / den
        }
    }
}

/// Evaluate `Hs(j2πf) * Hz(exp(j2πf))` over a frequency query.
///
/// `f` may be a scalar, a slice, a `Vec`, a fixed array or an ndarray with at
/// most one non-trivial axis; the result has the same shape.
///
/// # Errors
/// [`ConfigError::InvalidShape`](crate::kernel::ConfigError::InvalidShape)
/// (wrapped in [`ExecInvariantViolation::Config`]) when `f` has more than one
/// non-trivial axis.
///
/// # Examples
/// ```
/// use delsig_rs::signal::tfp::evaluate_tfp;
/// use delsig_rs::Zpk;
///
/// let hs = Zpk::from_real(&[0.3], &[0.5, 0.9], 1.0);
/// let hz = Zpk::from_real(&[], &[0.3, 0.9], 1.0);
/// let h = evaluate_tfp(&hs, &hz, &0.2_f64).unwrap();
/// assert!((h.re - 0.5611).abs() < 1e-4);
/// assert!((h.im - 0.1483).abs() < 1e-4);
/// ```
pub fn evaluate_tfp<F, Q>(hs: &Zpk<F>, hz: &Zpk<F>, f: &Q) -> Result<Q::Output, ExecInvariantViolation>
where
    F: Float + FloatConst,
    Q: FrequencyForm<F> + ?Sized,
{
    let kernel = TfpKernel::try_new(TfpConfig::new(hs.clone(), hz.clone()))
        .map_err(ExecInvariantViolation::from)?;
    kernel.run_form(f)
}
