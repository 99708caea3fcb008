//! Trait interfaces for signal-processing capabilities.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::signal::tfp::FrequencyForm;

use alloc::vec::Vec;
use delsig_rs_core::Complex;

/// Transfer-function-product evaluation over a frequency grid.
pub trait TfpEvaluate1D<F> {
    /// Evaluate each frequency in `f` into a caller-provided output buffer.
    fn run_into<I, O>(&self, f: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<Complex<F>> + ?Sized;

    /// Evaluate each frequency in `f` and allocate the output.
    fn run_alloc<I>(&self, f: &I) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized;

    /// Evaluate a frequency query of any supported shape, returning the same shape.
    fn run_form<Q>(&self, f: &Q) -> Result<Q::Output, ExecInvariantViolation>
    where
        Q: FrequencyForm<F> + ?Sized;
}
