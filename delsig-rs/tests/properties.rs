//! Property-based tests for the transfer-function, quadrature and quantizer kernels.

use delsig_rs::kernel::KernelLifecycle;
use delsig_rs::linalg::quadrature::{map_q_to_r, map_q_to_r_array};
use delsig_rs::na::DMatrix;
use delsig_rs::quantize::{bquantize_value, QuantizedValue};
use delsig_rs::signal::tfp::{evaluate_tfp, Cancellation, TfpConfig, TfpKernel};
use delsig_rs::{Complex, Zpk};
use ndarray::Array2;
use proptest::prelude::*;

// ===== Helpers =====

/// Continuous-time factor with every root at least 0.1 left of the imaginary axis.
fn stable_hs() -> impl Strategy<Value = Zpk<f64>> {
    (
        prop::collection::vec(-2.0f64..-0.1, 0..4),
        prop::collection::vec(-2.0f64..-0.1, 0..4),
        0.1f64..10.0,
    )
        .prop_map(|(zeros, poles, gain)| Zpk::from_real(&zeros, &poles, gain))
}

/// Discrete-time factor with poles inside radius 0.9.
fn stable_hz() -> impl Strategy<Value = Zpk<f64>> {
    (
        prop::collection::vec((-1.5f64..1.5, -1.5f64..1.5), 0..4),
        prop::collection::vec((0.0f64..0.9, 0.0f64..std::f64::consts::TAU), 0..4),
    )
        .prop_map(|(zeros, poles)| {
            Zpk::new(
                zeros.into_iter().map(|(re, im)| Complex::new(re, im)).collect(),
                poles
                    .into_iter()
                    .map(|(r, theta)| Complex::from_polar(r, theta))
                    .collect(),
                1.0,
            )
        })
}

fn complex_matrix() -> impl Strategy<Value = DMatrix<Complex<f64>>> {
    (0usize..5, 0usize..5).prop_flat_map(|(rows, cols)| {
        prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), rows * cols).prop_map(
            move |entries| {
                DMatrix::from_iterator(
                    rows,
                    cols,
                    entries.into_iter().map(|(re, im)| Complex::new(re, im)),
                )
            },
        )
    })
}

/// Approximations after 0, 1, ..., n terms.
fn partial_sums(q: &QuantizedValue<f64>) -> Vec<f64> {
    let mut sums = vec![0.0];
    let mut acc = 0.0;
    for digit in &q.terms {
        acc += digit.value::<f64>();
        sums.push(acc);
    }
    sums
}

// ===== Property Tests =====

proptest! {
    /// Property: one output per frequency, in order, for vector queries
    #[test]
    fn tfp_output_length_matches_query(
        hs in stable_hs(),
        hz in stable_hz(),
        f in prop::collection::vec(-0.5f64..0.5, 0..64)
    ) {
        let h = evaluate_tfp(&hs, &hz, &f).expect("vector query");
        prop_assert_eq!(h.len(), f.len());
    }

    /// Property: column-shaped ndarray queries keep their shape
    #[test]
    fn tfp_ndarray_shape_is_preserved(
        f in prop::collection::vec(0.0f64..0.5, 1..32)
    ) {
        let n = f.len();
        let column = Array2::from_shape_vec((n, 1), f).expect("column");
        let h = evaluate_tfp(&Zpk::identity(), &Zpk::from_real(&[], &[0.5], 1.0), &column)
            .expect("column query");
        prop_assert_eq!(h.shape(), &[n, 1]);
    }

    /// Property: away from poles the result is the plain product of both factors
    #[test]
    fn tfp_far_from_poles_is_direct_product(
        hs in stable_hs(),
        hz in stable_hz(),
        f in -0.5f64..0.5
    ) {
        let kernel = TfpKernel::try_new(TfpConfig::new(hs.clone(), hz.clone())).expect("kernel");
        prop_assert_eq!(kernel.classify(f), Cancellation::Direct);

        let w = 2.0 * std::f64::consts::PI * f;
        let direct = hs.eval(Complex::new(0.0, w)) * hz.eval(Complex::new(w.cos(), w.sin()));
        let h = kernel.evaluate(f);
        let scale = direct.norm().max(1.0);
        prop_assert!((h - direct).norm() <= 1e-12 * scale, "h = {}, direct = {}", h, direct);
    }

    /// Property: each complex entry becomes the block [[re, -im], [im, re]]
    #[test]
    fn quadrature_blocks_hold_parts(m in complex_matrix()) {
        let r = map_q_to_r(&m);
        prop_assert_eq!(r.shape(), (2 * m.nrows(), 2 * m.ncols()));
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                let q = m[(i, j)];
                prop_assert_eq!(r[(2 * i, 2 * j)], q.re);
                prop_assert_eq!(r[(2 * i + 1, 2 * j + 1)], q.re);
                prop_assert_eq!(r[(2 * i, 2 * j + 1)], -q.im);
                prop_assert_eq!(r[(2 * i + 1, 2 * j)], q.im);
            }
        }

        let a = Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)]);
        let ra = map_q_to_r_array(a.view());
        prop_assert_eq!(ra.dim(), r.shape());
    }

    /// Property: the approximation is exactly the in-order sum of its digits
    #[test]
    fn quantized_value_is_sum_of_digits(x in -1e6f64..1e6, nsd in 0usize..12) {
        let q = bquantize_value(x, nsd, f64::EPSILON, 10.0 * f64::EPSILON);
        prop_assert!(q.len() <= nsd);
        prop_assert_eq!(q.approx, q.value_from_terms());
    }

    /// Property: adding a digit never makes the approximation worse
    #[test]
    fn quantizer_error_is_non_increasing(x in -10.0f64..10.0, nsd in 1usize..=8) {
        let q = bquantize_value(x, nsd, f64::EPSILON, 10.0 * f64::EPSILON);
        let slack = 4.0 * f64::EPSILON * x.abs();
        let errors: Vec<f64> = partial_sums(&q).iter().map(|a| (a - x).abs()).collect();
        for pair in errors.windows(2) {
            prop_assert!(pair[1] <= pair[0] + slack, "errors {:?} for x = {}", errors, x);
        }
    }

    /// Property: exactly representable values need no digits beyond their own
    #[test]
    fn powers_of_two_take_one_digit(p in -30i32..30, negative in any::<bool>()) {
        let x = if negative { -(2.0f64.powi(p)) } else { 2.0f64.powi(p) };
        let q = bquantize_value(x, 3, f64::EPSILON, 10.0 * f64::EPSILON);
        prop_assert_eq!(q.len(), 1);
        prop_assert_eq!(q.terms[0].exponent, p);
        prop_assert_eq!(q.approx, x);
    }
}

#[test]
fn zero_input_is_already_converged() {
    let q = bquantize_value(0.0f64, 3, f64::EPSILON, 10.0 * f64::EPSILON);
    assert!(q.is_empty());
    assert_eq!(q.approx, 0.0);
}
