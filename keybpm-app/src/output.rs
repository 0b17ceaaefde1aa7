//! JSON records written to stdout and stderr
//!
//! Stdout only ever carries one `TrackReport`. Stderr carries the startup
//! diagnostics record and, on failure, one error record.

use keybpm_analysis::TrackReport;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;

/// Failure record for the diagnostic channel
#[derive(Debug, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl ErrorRecord {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            file_path: None,
        }
    }

    pub fn for_file(error: impl Into<String>, path: &Path) -> Self {
        Self {
            error: error.into(),
            file_path: Some(path.display().to_string()),
        }
    }
}

/// Write one JSON object followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut out: W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    out.flush()
}

pub fn write_report<W: Write>(out: W, report: &TrackReport) -> io::Result<()> {
    write_json(out, report)
}

pub fn write_error<W: Write>(out: W, record: &ErrorRecord) -> io::Result<()> {
    write_json(out, record)
}

/// Informational runtime identity, never part of the result contract
pub fn write_diagnostics<W: Write>(out: W) -> io::Result<()> {
    let executable = std::env::current_exe()
        .ok()
        .map(|p| p.display().to_string());
    let record = json!({
        "diagnostic_executable": executable,
        "diagnostic_version": env!("CARGO_PKG_VERSION"),
        "diagnostic_platform": format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
    });
    write_json(out, &record)
}
