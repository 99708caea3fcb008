/// Capability traits implemented by the signal kernels.
pub mod traits;

/// Continuous-time by discrete-time transfer function products.
pub mod tfp;
