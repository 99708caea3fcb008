//! Zero-pole-gain primitives shared by the `delsig-rs` kernels.
//!
//! The kernels never expand polynomials or find roots; they only evaluate
//! products of linear factors through [`zpk::eval_rpoly`] and
//! [`zpk::eval_tf`].

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// Zero-pole-gain representation and evaluation.
pub mod zpk;

pub use num_complex::Complex;
