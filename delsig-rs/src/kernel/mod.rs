//! Shared trait-first kernel substrate.
//!
//! Constructor validation ([`KernelLifecycle`]), error types, and the 1D
//! buffer adapters used by the transfer-function, quadrature and quantizer
//! kernels.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
