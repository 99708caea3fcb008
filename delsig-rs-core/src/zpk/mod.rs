use core::borrow::Borrow;

use num_complex::Complex;
use num_traits::Float;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Evaluate `k * prod(x - root)` over an arbitrary set of roots.
///
/// The roots may be any iterator, so callers can pass a filtered subset
/// (for example the roots left over after a cancellation) without
/// collecting it first. An empty root set evaluates to `k`.
///
/// # Examples
/// ```
/// use delsig_rs_core::zpk::eval_rpoly;
/// use delsig_rs_core::Complex;
///
/// let roots = [Complex::new(1.0, 0.0), Complex::new(-2.0, 0.0)];
/// let y = eval_rpoly(roots.iter(), Complex::new(3.0, 0.0), 2.0);
/// assert_eq!(y, Complex::new(20.0, 0.0));
/// ```
pub fn eval_rpoly<F, B, I>(roots: I, x: Complex<F>, k: F) -> Complex<F>
where
    F: Float,
    B: Borrow<Complex<F>>,
    I: IntoIterator<Item = B>,
{
    roots
        .into_iter()
        .fold(Complex::new(k, F::zero()), |acc, root| {
            acc * (x - *root.borrow())
        })
}

/// Evaluate the rational function `k * prod(x - zeros) / prod(x - poles)`.
///
/// The result at a pole is not defined; callers that may land on a pole
/// have to detect it themselves.
pub fn eval_tf<F, BZ, IZ, BP, IP>(zeros: IZ, poles: IP, k: F, x: Complex<F>) -> Complex<F>
where
    F: Float,
    BZ: Borrow<Complex<F>>,
    IZ: IntoIterator<Item = BZ>,
    BP: Borrow<Complex<F>>,
    IP: IntoIterator<Item = BP>,
{
    eval_rpoly(zeros, x, k) / eval_rpoly(poles, x, F::one())
}

/// A SISO transfer function in zero-pole-gain form.
///
/// The same type is used for continuous-time (`s`-plane) and discrete-time
/// (`z`-plane) transfer functions; which plane applies is decided by the
/// caller.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk<F> {
    /// Zeros, in caller order.
    pub zeros: Vec<Complex<F>>,
    /// Poles, in caller order.
    pub poles: Vec<Complex<F>>,
    /// Leading gain.
    pub gain: F,
}

#[cfg(feature = "alloc")]
impl<F> Zpk<F>
where
    F: Float,
{
    /// Build a zpk tuple from complex roots.
    pub fn new(zeros: Vec<Complex<F>>, poles: Vec<Complex<F>>, gain: F) -> Self {
        Self { zeros, poles, gain }
    }

    /// Build a zpk tuple from purely real roots.
    pub fn from_real(zeros: &[F], poles: &[F], gain: F) -> Self {
        let lift = |r: &F| Complex::new(*r, F::zero());
        Self {
            zeros: zeros.iter().map(lift).collect(),
            poles: poles.iter().map(lift).collect(),
            gain,
        }
    }

    /// Unity gain with no zeros and no poles.
    pub fn identity() -> Self {
        Self {
            zeros: Vec::new(),
            poles: Vec::new(),
            gain: F::one(),
        }
    }

    /// Evaluate the transfer function at `x`.
    pub fn eval(&self, x: Complex<F>) -> Complex<F> {
        eval_tf(self.zeros.iter(), self.poles.iter(), self.gain, x)
    }
}
