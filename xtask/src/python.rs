//! Reference evaluations through the `deltasigma` Python toolbox.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

const DEFAULT_PYTHON_BIN: &str = "python";

/// Interpreter override.
pub const PYTHON_ENV: &str = "DELSIG_PYTHON";

const PY_TOOLBOX_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import deltasigma as ds

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _roots(pairs):
    return np.asarray([complex(re, im) for re, im in pairs], dtype=complex)

def _zpk(key):
    tf = p[key]
    return (_roots(tf["zeros"]), _roots(tf["poles"]), float(tf["gain"]))

def _interleave(h):
    h = np.asarray(h, dtype=complex).reshape(-1)
    out = np.empty(2 * h.size, dtype=float)
    out[0::2] = h.real
    out[1::2] = h.imag
    return out

def _compute():
    if op == "evalTFP":
        return _interleave(ds.evalTFP(_zpk("hs"), _zpk("hz"), np.asarray(p["f"], dtype=float)))
    if op == "mapQtoR":
        m = np.asarray(p["re"], dtype=float) + 1j * np.asarray(p["im"], dtype=float)
        return ds.mapQtoR(m).reshape(-1)
    if op == "bquantize":
        return np.asarray([y.val for y in ds.bquantize(np.asarray(p["x"], dtype=float), int(p["nsd"]))], dtype=float)
    raise RuntimeError(f"unsupported op: {op}")

y = np.asarray(_compute(), dtype=float).reshape(-1)

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "deltasigma_version": getattr(ds, "__version__", None),
    "matplotlib_version": None
}))
"#;

const PY_VERSION_SCRIPT: &str = r#"
import json, sys
import numpy
import deltasigma
import matplotlib
sys.stdin.read()
print(json.dumps({
    "output": [],
    "avg_ns": 0.0,
    "python_version": sys.version.split()[0],
    "numpy_version": numpy.__version__,
    "deltasigma_version": getattr(deltasigma, "__version__", None),
    "matplotlib_version": matplotlib.__version__
}))
"#;

/// One reference evaluation, timed inside the interpreter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PythonEval {
    pub output: Vec<f64>,
    pub avg_ns: f64,
    pub python_version: String,
    pub numpy_version: String,
    pub deltasigma_version: Option<String>,
    pub matplotlib_version: Option<String>,
}

/// `$DELSIG_PYTHON`, or `python` on the `PATH`.
pub fn detect_python_bin() -> PathBuf {
    std::env::var_os(PYTHON_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

pub fn versions(python_bin: &Path) -> Result<PythonEval> {
    run_json(python_bin, PY_VERSION_SCRIPT, &json!({}))
}

/// Run `op` on `payload` in the toolbox, `iters` times for timing.
pub fn toolbox_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    debug!(op, iters, "evaluating python reference");
    run_json(
        python_bin,
        PY_TOOLBOX_SCRIPT,
        &json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
    .with_context(|| format!("python reference for `{op}`"))
}

/// Run `script` with `payload` on stdin and return its stdout on success.
pub fn run_script(python_bin: &Path, script: &str, payload: &serde_json::Value) -> Result<Vec<u8>> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let bytes = serde_json::to_vec(payload).context("serializing python payload")?;
        stdin
            .write_all(&bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        bail!(
            "python exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output.stdout)
}

fn run_json(python_bin: &Path, script: &str, payload: &serde_json::Value) -> Result<PythonEval> {
    let stdout = run_script(python_bin, script, payload)?;
    let stdout = String::from_utf8(stdout).context("parsing python stdout utf8")?;
    serde_json::from_str(stdout.trim()).context("parsing python json")
}
