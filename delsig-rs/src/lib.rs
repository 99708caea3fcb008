//! Numerical kernels for delta-sigma modulator design.
//!
//! - [`signal::tfp`]: evaluate a continuous-time and discrete-time transfer
//!   function product with pole/zero cancellation.
//! - [`linalg::quadrature`]: map a complex (quadrature) matrix to its real
//!   block equivalent.
//! - [`quantize`]: bounded-length canonical-signed-digit quantization.
//!
//! Every algorithm is available as a free function and as a trait-first
//! kernel built through [`kernel::KernelLifecycle`].

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// Trait-first kernel substrate: config validation, errors and 1D adapters.
pub mod kernel;

/// Transfer-function evaluation.
#[cfg(feature = "alloc")]
pub mod signal;

/// Complex to real matrix transforms.
#[cfg(feature = "alloc")]
pub mod linalg;

/// Canonical-signed-digit quantization.
#[cfg(feature = "alloc")]
pub mod quantize;

pub use delsig_rs_core::zpk::{eval_rpoly, eval_tf};
#[cfg(feature = "alloc")]
pub use delsig_rs_core::zpk::Zpk;
pub use delsig_rs_core::Complex;

/// Re-export of nalgebra for matrix inputs.
pub use nalgebra as na;
