//! Contract rows, summary files and the matplotlib report.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::python::{run_script, PythonEval};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContractRow {
    pub case_id: String,
    pub len: usize,
    pub mae: f64,
    pub rmse: f64,
    pub max_abs: f64,
    pub max_rel: f64,
    pub kernel_ns: f64,
    pub free_fn_ns: f64,
    pub python_ns: f64,
    pub speedup_vs_python: f64,
    pub overlay_plot: String,
    pub residual_plot: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContractBundle {
    pub generated_epoch_seconds: u64,
    pub python_executable: String,
    pub python_version: String,
    pub numpy_version: String,
    pub deltasigma_version: String,
    pub matplotlib_version: String,
    pub rows: Vec<ContractRow>,
}

/// Outputs and timings collected for one case.
pub struct CaseResult<'a> {
    pub case_id: &'a str,
    pub kernel: Vec<f64>,
    pub free_fn: Vec<f64>,
    pub python: PythonEval,
    pub kernel_ns: f64,
    pub free_fn_ns: f64,
}

/// Accumulates rows and the plot payload across cases.
pub struct Report {
    plots_dir: PathBuf,
    rows: Vec<ContractRow>,
    plot_cases: Vec<serde_json::Value>,
}

impl Report {
    pub fn new(plots_dir: PathBuf) -> Self {
        Self {
            plots_dir,
            rows: Vec::new(),
            plot_cases: Vec::new(),
        }
    }

    pub fn into_rows(self) -> Vec<ContractRow> {
        self.rows
    }

    /// Check both Rust paths agree in length with the reference and record the case.
    pub fn record(&mut self, case: CaseResult<'_>) -> Result<()> {
        let id = case.case_id;
        same_length(id, "free function", &case.kernel, &case.free_fn)?;
        same_length(id, "python", &case.kernel, &case.python.output)?;
        if case.kernel != case.free_fn {
            bail!("case {id}: kernel and free function disagree");
        }

        let overlay = self.plots_dir.join(format!("{id}_overlay.png"));
        let residual = self.plots_dir.join(format!("{id}_residual.png"));
        let errors = ErrorStats::between(&case.kernel, &case.python.output);
        tracing::info!(
            case = id,
            max_abs = errors.max_abs,
            max_rel = errors.max_rel,
            "contract case compared"
        );

        self.rows.push(ContractRow {
            case_id: id.to_string(),
            len: case.kernel.len(),
            mae: errors.mae,
            rmse: errors.rmse,
            max_abs: errors.max_abs,
            max_rel: errors.max_rel,
            kernel_ns: case.kernel_ns,
            free_fn_ns: case.free_fn_ns,
            python_ns: case.python.avg_ns,
            speedup_vs_python: case.python.avg_ns / case.kernel_ns,
            overlay_plot: overlay.to_string_lossy().into_owned(),
            residual_plot: residual.to_string_lossy().into_owned(),
        });
        self.plot_cases.push(json!({
            "case_id": id,
            "rust": case.kernel,
            "python": case.python.output,
            "overlay_plot": overlay.to_string_lossy(),
            "residual_plot": residual.to_string_lossy()
        }));
        Ok(())
    }

    /// Render every recorded case to PNGs and a multi-page PDF.
    pub fn render_pdf(&self, python_bin: &Path, report_pdf: &Path) -> Result<()> {
        let payload = json!({
            "cases": self.plot_cases,
            "report_pdf": report_pdf.to_string_lossy()
        });
        run_script(python_bin, PY_PLOT_SCRIPT, &payload).context("rendering contract report")?;
        Ok(())
    }
}

fn same_length(case_id: &str, what: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id}: {what} output has {} values, kernel has {}",
            b.len(),
            a.len()
        );
    }
    Ok(())
}

struct ErrorStats {
    mae: f64,
    rmse: f64,
    max_abs: f64,
    max_rel: f64,
}

impl ErrorStats {
    fn between(rust: &[f64], reference: &[f64]) -> Self {
        let n = rust.len().max(1) as f64;
        let mut sum_abs = 0.0;
        let mut sum_sq = 0.0;
        let mut max_abs = 0.0f64;
        let mut max_rel = 0.0f64;
        for (r, p) in rust.iter().zip(reference) {
            let d = (r - p).abs();
            sum_abs += d;
            sum_sq += d * d;
            max_abs = max_abs.max(d);
            if p.abs() > f64::EPSILON {
                max_rel = max_rel.max(d / p.abs());
            }
        }
        Self {
            mae: sum_abs / n,
            rmse: (sum_sq / n).sqrt(),
            max_abs,
            max_rel,
        }
    }
}

pub fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::from(
        "case_id,len,mae,rmse,max_abs,max_rel,kernel_ns,free_fn_ns,python_ns,speedup_vs_python,overlay_plot,residual_plot\n",
    );
    for row in rows {
        writeln!(
            out,
            "{},{},{:.3e},{:.3e},{:.3e},{:.3e},{:.1},{:.1},{:.1},{:.2},{},{}",
            row.case_id,
            row.len,
            row.mae,
            row.rmse,
            row.max_abs,
            row.max_rel,
            row.kernel_ns,
            row.free_fn_ns,
            row.python_ns,
            row.speedup_vs_python,
            row.overlay_plot,
            row.residual_plot
        )
        .context("formatting csv row")?;
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

pub fn write_summary_json(path: &Path, bundle: &ContractBundle) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(bundle).context("serializing summary bundle")?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

const PY_PLOT_SCRIPT: &str = r#"
import json
import sys
import matplotlib
matplotlib.use("Agg")
import matplotlib.pyplot as plt
from matplotlib.backends.backend_pdf import PdfPages

payload = json.loads(sys.stdin.read())

def _figure(case_id, title, ylabel):
    fig, ax = plt.subplots(figsize=(10, 4))
    ax.set_title(f"{case_id} :: {title}")
    ax.set_xlabel("index")
    ax.set_ylabel(ylabel)
    return fig, ax

with PdfPages(payload["report_pdf"]) as pdf:
    for case in payload["cases"]:
        rust, ref = case["rust"], case["python"]
        idx = range(len(ref))

        fig, ax = _figure(case["case_id"], "overlay", "value")
        ax.plot(idx, ref, label="deltasigma", linewidth=1.6)
        ax.plot(idx, rust, "--", label="delsig-rs", linewidth=1.2)
        ax.legend()
        fig.tight_layout()
        fig.savefig(case["overlay_plot"], dpi=150)
        pdf.savefig(fig)
        plt.close(fig)

        fig, ax = _figure(case["case_id"], "residual", "rust - python")
        ax.plot(idx, [r - p for r, p in zip(rust, ref)], color="tab:red", linewidth=1.2)
        fig.tight_layout()
        fig.savefig(case["residual_plot"], dpi=150)
        pdf.savefig(fig)
        plt.close(fig)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_stats_of_known_residuals() {
        let stats = ErrorStats::between(&[1.0, 2.0, 3.0], &[1.0, 2.5, 2.0]);
        assert!((stats.mae - 0.5).abs() < 1e-12);
        assert!((stats.max_abs - 1.0).abs() < 1e-12);
        assert!((stats.max_rel - 0.5).abs() < 1e-12);
        assert!((stats.rmse - (1.25f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_outputs_have_zero_error() {
        let stats = ErrorStats::between(&[], &[]);
        assert_eq!(stats.mae, 0.0);
        assert_eq!(stats.max_abs, 0.0);
    }
}
