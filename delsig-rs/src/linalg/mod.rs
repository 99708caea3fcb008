/// Quadrature (complex) to real state-space matrix mapping.
pub mod quadrature;

pub use quadrature::*;
