//! Kernel form of the signed-digit quantizer.

use crate::kernel::{
    bind_output, check_tolerance, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    Write1D,
};
use alloc::vec::Vec;
use num_traits::Float;
use tracing::debug;

use super::{bquantize, bquantize_value, QuantizedValue};

/// 1D signed-digit quantization capability.
pub trait SignedDigitQuantize1D<F> {
    /// Write the quantized values into a caller-provided output buffer.
    fn run_into<I, O>(&self, x: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized;

    /// Quantize and allocate the full digit records.
    fn run_alloc<I>(&self, x: &I) -> Result<Vec<QuantizedValue<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized;
}

/// Constructor config for [`SignedDigitKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeConfig<F> {
    /// Maximum number of signed digits per value.
    pub nsd: usize,
    /// Absolute error at which quantization stops early.
    pub abstol: F,
    /// Error relative to `|x|` at which quantization stops early.
    pub reltol: F,
}

impl<F: Float> Default for QuantizeConfig<F> {
    /// `nsd = 3`, `abstol = eps`, `reltol = 10 * eps`.
    fn default() -> Self {
        let eps = F::epsilon();
        let ten = F::from(10.0).unwrap_or_else(F::one);
        Self {
            nsd: 3,
            abstol: eps,
            reltol: ten * eps,
        }
    }
}

impl<F: Float> QuantizeConfig<F> {
    /// Default tolerances with `nsd` digits.
    pub fn with_digits(nsd: usize) -> Self {
        Self {
            nsd,
            ..Self::default()
        }
    }
}

/// Trait-first signed-digit quantization kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedDigitKernel<F> {
    nsd: usize,
    abstol: F,
    reltol: F,
}

impl<F: Float> SignedDigitKernel<F> {
    /// Maximum digits per value.
    pub fn nsd(&self) -> usize {
        self.nsd
    }

    /// Quantize a single value.
    pub fn quantize(&self, x: F) -> QuantizedValue<F> {
        bquantize_value(x, self.nsd, self.abstol, self.reltol)
    }
}

impl<F: Float> KernelLifecycle for SignedDigitKernel<F> {
    type Config = QuantizeConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        check_tolerance("abstol", config.abstol)?;
        check_tolerance("reltol", config.reltol)?;
        debug!(
            nsd = config.nsd,
            abstol = ?config.abstol.to_f64(),
            reltol = ?config.reltol.to_f64(),
            "signed-digit kernel configured"
        );
        Ok(Self {
            nsd: config.nsd,
            abstol: config.abstol,
            reltol: config.reltol,
        })
    }
}

impl<F: Float> SignedDigitQuantize1D<F> for SignedDigitKernel<F> {
    fn run_into<I, O>(&self, x: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let x = x.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = bind_output(out, "out", x.len())?;
        for (xi, yi) in x.iter().zip(out.iter_mut()) {
            *yi = self.quantize(*xi).approx;
        }
        Ok(())
    }

    fn run_alloc<I>(&self, x: &I) -> Result<Vec<QuantizedValue<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let x = x.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(bquantize(x, self.nsd, self.abstol, self.reltol))
    }
}
