//! Trait-first kernel for transfer-function-product evaluation.

use crate::kernel::{
    bind_output, check_positive_tolerance, ConfigError, ExecInvariantViolation, KernelLifecycle,
    Read1D, Write1D,
};
use crate::signal::traits::TfpEvaluate1D;
use alloc::vec::Vec;
use delsig_rs_core::zpk::Zpk;
use delsig_rs_core::Complex;
use num_traits::{Float, FloatConst};
use tracing::{debug, trace};

use super::{evaluate_point, frequency_point, Cancellation, CancellationTolerance, FrequencyForm};

/// Constructor config for [`TfpKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct TfpConfig<F> {
    /// Continuous-time transfer function, evaluated at `s = j2πf`.
    pub hs: Zpk<F>,
    /// Discrete-time transfer function, evaluated at `z = exp(j2πf)`.
    pub hz: Zpk<F>,
    /// Cancellation distances. `None` derives them from the root counts.
    pub tolerance: Option<CancellationTolerance<F>>,
}

impl<F: Float> TfpConfig<F> {
    /// Config with tolerances derived from `hs` and `hz`.
    pub fn new(hs: Zpk<F>, hz: Zpk<F>) -> Self {
        Self {
            hs,
            hz,
            tolerance: None,
        }
    }
}

/// Evaluates `Hs(j2πf) * Hz(exp(j2πf))` with pole/zero cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct TfpKernel<F> {
    hs: Zpk<F>,
    hz: Zpk<F>,
    tolerance: CancellationTolerance<F>,
}

impl<F> TfpKernel<F>
where
    F: Float + FloatConst,
{
    /// Continuous-time factor.
    pub fn hs(&self) -> &Zpk<F> {
        &self.hs
    }

    /// Discrete-time factor.
    pub fn hz(&self) -> &Zpk<F> {
        &self.hz
    }

    /// Cancellation distances in use.
    pub fn tolerance(&self) -> CancellationTolerance<F> {
        self.tolerance
    }

    /// Which evaluation branch applies at frequency `f`.
    pub fn classify(&self, f: F) -> Cancellation {
        let (s, z) = frequency_point(f);
        Cancellation::detect(&self.hs, &self.hz, &self.tolerance, s, z)
    }

    /// Evaluate a single frequency.
    pub fn evaluate(&self, f: F) -> Complex<F> {
        self.evaluate_indexed(0, f)
    }

    fn evaluate_indexed(&self, index: usize, f: F) -> Complex<F> {
        let (s, z) = frequency_point(f);
        let case = Cancellation::detect(&self.hs, &self.hz, &self.tolerance, s, z);
        if case != Cancellation::Direct {
            trace!(index, ?case, "pole at evaluation point");
        }
        evaluate_point(&self.hs, &self.hz, &self.tolerance, s, z, case)
    }

    fn evaluate_slice(&self, f: &[F], out: &mut [Complex<F>]) {
        for (index, (fi, yi)) in f.iter().zip(out.iter_mut()).enumerate() {
            *yi = self.evaluate_indexed(index, *fi);
        }
    }
}

impl<F> KernelLifecycle for TfpKernel<F>
where
    F: Float + FloatConst,
{
    type Config = TfpConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let tolerance = match config.tolerance {
            Some(tol) => {
                check_positive_tolerance("tolerance.s_lim", tol.s_lim)?;
                check_positive_tolerance("tolerance.z_lim", tol.z_lim)?;
                tol
            }
            None => CancellationTolerance::for_roots(&config.hs, &config.hz),
        };
        debug!(
            s_poles = config.hs.poles.len(),
            z_zeros = config.hz.zeros.len(),
            s_lim = ?tolerance.s_lim.to_f64(),
            z_lim = ?tolerance.z_lim.to_f64(),
            "tfp kernel configured"
        );
        Ok(Self {
            hs: config.hs,
            hz: config.hz,
            tolerance,
        })
    }
}

impl<F> TfpEvaluate1D<F> for TfpKernel<F>
where
    F: Float + FloatConst,
{
    fn run_into<I, O>(&self, f: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<Complex<F>> + ?Sized,
    {
        let f = f.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = bind_output(out, "out", f.len())?;
        self.evaluate_slice(f, out);
        Ok(())
    }

    fn run_alloc<I>(&self, f: &I) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let f = f.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = alloc::vec![Complex::new(F::zero(), F::zero()); f.len()];
        self.evaluate_slice(f, &mut out);
        Ok(out)
    }

    fn run_form<Q>(&self, f: &Q) -> Result<Q::Output, ExecInvariantViolation>
    where
        Q: FrequencyForm<F> + ?Sized,
    {
        let flat = f.flatten_query().map_err(ExecInvariantViolation::from)?;
        let values = self.run_alloc(&flat)?;
        f.restore(values).map_err(ExecInvariantViolation::from)
    }
}
