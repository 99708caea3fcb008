//! Developer tasks for the delsig-rs workspace.
//!
//! `cargo run -p xtask -- contracts` evaluates every kernel against the
//! `deltasigma` Python toolbox and writes CSV/JSON summaries and a PDF report
//! under `target/contracts/<epoch>/`.

mod python;
mod report;

use anyhow::{anyhow, Context, Result};
use delsig_rs::kernel::KernelLifecycle;
use delsig_rs::linalg::quadrature::{
    map_q_to_r, QuadratureMapConfig, QuadratureMapKernel, QuadratureRealMap,
};
use delsig_rs::na::DMatrix;
use delsig_rs::quantize::{bquantize, QuantizeConfig, SignedDigitKernel, SignedDigitQuantize1D};
use delsig_rs::signal::tfp::{evaluate_tfp, TfpConfig, TfpKernel};
use delsig_rs::signal::traits::TfpEvaluate1D;
use delsig_rs::{Complex, Zpk};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report::{CaseResult, ContractBundle, Report};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xtask=info,delsig_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            eprintln!();
            eprintln!(
                "Set {} to choose the interpreter that has `deltasigma` installed.",
                python::PYTHON_ENV
            );
            Ok(())
        }
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    let plots_dir = out_dir.join("plots");
    fs::create_dir_all(&plots_dir).context("creating contract output directories")?;

    let python_bin = python::detect_python_bin();
    info!(python = %python_bin.display(), out = %out_dir.display(), "running contracts");

    let mut report = Report::new(plots_dir.clone());

    let grid: Vec<f64> = (0..=256).map(|k| 0.5 * k as f64 / 256.0).collect();
    tfp_case(
        &mut report,
        &python_bin,
        "evaluate_tfp_lowpass",
        Zpk::from_real(&[0.301], &[0.5, 0.9], 1.0),
        Zpk::from_real(&[], &[0.3, 0.9], 1.0),
        &grid,
    )?;
    // Integrators in the loop filter cancel the NTF zeros at DC.
    tfp_case(
        &mut report,
        &python_bin,
        "evaluate_tfp_dc_cancellation",
        Zpk::from_real(&[-0.2], &[0.0, 0.0], 1.0),
        Zpk::new(
            vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)],
            vec![Complex::new(0.6, 0.3), Complex::new(0.6, -0.3)],
            1.0,
        ),
        &grid,
    )?;
    quadrature_case(&mut report, &python_bin)?;
    bquantize_case(&mut report, &python_bin)?;

    let version_probe = python::versions(&python_bin)?;
    let report_pdf = out_dir.join("report.pdf");
    report.render_pdf(&python_bin, &report_pdf)?;

    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.to_string_lossy().into_owned(),
        python_version: version_probe.python_version,
        numpy_version: version_probe.numpy_version,
        deltasigma_version: version_probe
            .deltasigma_version
            .unwrap_or_else(|| "unknown".to_string()),
        matplotlib_version: version_probe
            .matplotlib_version
            .unwrap_or_else(|| "unknown".to_string()),
        rows: report.into_rows(),
    };

    report::write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;
    report::write_summary_json(&out_dir.join("summary.json"), &bundle)?;

    println!("Contract artifacts generated in: {}", out_dir.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - {}", out_dir.join("summary.json").display());
    println!("  - {}", report_pdf.display());
    println!("  - {}", plots_dir.display());
    println!("  - cases: {}", bundle.rows.len());

    Ok(())
}

fn tfp_case(
    report: &mut Report,
    python_bin: &std::path::Path,
    case_id: &str,
    hs: Zpk<f64>,
    hz: Zpk<f64>,
    f: &[f64],
) -> Result<()> {
    let kernel = TfpKernel::try_new(TfpConfig::new(hs.clone(), hz.clone()))?;
    let kernel_out = kernel
        .run_alloc(f)
        .map_err(|e| anyhow!("{case_id}: kernel execution failed: {e}"))?;
    let free_out = evaluate_tfp(&hs, &hz, f)
        .map_err(|e| anyhow!("{case_id}: free function failed: {e}"))?;
    let python = python::toolbox_eval(
        python_bin,
        "evalTFP",
        json!({ "hs": zpk_json(&hs), "hz": zpk_json(&hz), "f": f }),
        50,
    )?;

    let mut out = vec![Complex::new(0.0, 0.0); f.len()];
    let kernel_ns = benchmark_avg_ns(200, || {
        kernel
            .run_into(f, &mut out)
            .map_err(|e| anyhow!("{case_id}: kernel benchmark failed: {e}"))
    })?;
    let free_fn_ns = benchmark_avg_ns(200, || {
        evaluate_tfp(&hs, &hz, f)
            .map(|_| ())
            .map_err(|e| anyhow!("{case_id}: free function benchmark failed: {e}"))
    })?;

    report.record(CaseResult {
        case_id,
        kernel: interleave(&kernel_out),
        free_fn: interleave(&free_out),
        python,
        kernel_ns,
        free_fn_ns,
    })
}

fn quadrature_case(report: &mut Report, python_bin: &std::path::Path) -> Result<()> {
    let case_id = "map_q_to_r_ramp";
    let m = DMatrix::from_fn(6, 7, |i, j| {
        let a = (1 + i + 6 * j) as f64;
        Complex::new(a, 0.5 * a - 3.0)
    });

    let kernel = QuadratureMapKernel::try_new(QuadratureMapConfig {
        expected_shape: Some(m.shape()),
    })?;
    let kernel_out = kernel
        .run(&m)
        .map_err(|e| anyhow!("{case_id}: kernel execution failed: {e}"))?;
    let free_out = map_q_to_r(&m);
    let python = python::toolbox_eval(
        python_bin,
        "mapQtoR",
        json!({
            "re": rows_of(&m.map(|q| q.re)),
            "im": rows_of(&m.map(|q| q.im)),
        }),
        200,
    )?;

    let kernel_ns = benchmark_avg_ns(500, || {
        kernel
            .run(&m)
            .map(|_| ())
            .map_err(|e| anyhow!("{case_id}: kernel benchmark failed: {e}"))
    })?;
    let free_fn_ns = benchmark_avg_ns(500, || {
        let _ = map_q_to_r(&m);
        Ok(())
    })?;

    report.record(CaseResult {
        case_id,
        kernel: row_major(&kernel_out),
        free_fn: row_major(&free_out),
        python,
        kernel_ns,
        free_fn_ns,
    })
}

fn bquantize_case(report: &mut Report, python_bin: &std::path::Path) -> Result<()> {
    let case_id = "bquantize_linspace_nsd3";
    let x: Vec<f64> = (0..101).map(|k| -10.0 + 0.2 * k as f64).collect();
    let config = QuantizeConfig::<f64>::default();

    let kernel = SignedDigitKernel::try_new(config)?;
    let mut kernel_out = vec![0.0; x.len()];
    kernel
        .run_into(x.as_slice(), &mut kernel_out)
        .map_err(|e| anyhow!("{case_id}: kernel execution failed: {e}"))?;
    let free_out: Vec<f64> = bquantize(&x, config.nsd, config.abstol, config.reltol)
        .into_iter()
        .map(|q| q.approx)
        .collect();
    let python = python::toolbox_eval(
        python_bin,
        "bquantize",
        json!({ "x": x, "nsd": config.nsd }),
        50,
    )?;

    let mut scratch = vec![0.0; x.len()];
    let kernel_ns = benchmark_avg_ns(200, || {
        kernel
            .run_into(x.as_slice(), &mut scratch)
            .map_err(|e| anyhow!("{case_id}: kernel benchmark failed: {e}"))
    })?;
    let free_fn_ns = benchmark_avg_ns(200, || {
        let _ = bquantize(&x, config.nsd, config.abstol, config.reltol);
        Ok(())
    })?;

    report.record(CaseResult {
        case_id,
        kernel: kernel_out,
        free_fn: free_out,
        python,
        kernel_ns,
        free_fn_ns,
    })
}

fn zpk_json(h: &Zpk<f64>) -> serde_json::Value {
    let pairs = |roots: &[Complex<f64>]| roots.iter().map(|r| [r.re, r.im]).collect::<Vec<_>>();
    json!({
        "zeros": pairs(h.zeros.as_slice()),
        "poles": pairs(h.poles.as_slice()),
        "gain": h.gain
    })
}

/// `[re0, im0, re1, im1, ...]`.
fn interleave(h: &[Complex<f64>]) -> Vec<f64> {
    h.iter().flat_map(|c| [c.re, c.im]).collect()
}

fn rows_of(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

fn row_major(m: &DMatrix<f64>) -> Vec<f64> {
    rows_of(m).into_iter().flatten().collect()
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}
