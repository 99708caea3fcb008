use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use delsig_rs::kernel::KernelLifecycle;
use delsig_rs::quantize::{bquantize, QuantizeConfig, SignedDigitKernel, SignedDigitQuantize1D};
use rand::Rng;

fn bquantize_coefficients(c: &mut Criterion) {
    let mut rng = rand::rng();
    let x: Vec<f64> = (0..10_000).map(|_| rng.random_range(-4.0..4.0)).collect();
    let mut out = vec![0.0; x.len()];

    let mut group = c.benchmark_group("bquantize");
    for nsd in [3usize, 6, 12] {
        let kernel = SignedDigitKernel::try_new(QuantizeConfig::<f64>::with_digits(nsd))
            .expect("valid quantizer config");

        group.bench_with_input(BenchmarkId::new("kernel_run_into", nsd), &x, |b, x| {
            b.iter(|| {
                kernel
                    .run_into(black_box(x.as_slice()), &mut out)
                    .expect("output length matches input");
            })
        });
        group.bench_with_input(BenchmarkId::new("records", nsd), &x, |b, x| {
            b.iter(|| black_box(bquantize(black_box(x), nsd, f64::EPSILON, 10.0 * f64::EPSILON)))
        });
    }
    group.finish();
}

criterion_group!(benches, bquantize_coefficients);
criterion_main!(benches);
