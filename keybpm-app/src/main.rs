//! keybpm - estimate the tempo and key of an audio file
//!
//! Usage: `keybpm <audio-file>`
//!
//! Prints `{"bpm": ..., "key": ...}` to stdout on success. Failures print a
//! JSON error record to stderr and exit with status 1.

mod logging;
mod output;

use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use keybpm_analysis::{AnalysisConfig, TrackAnalyzer, TrackReport};
use keybpm_library::TrackLoader;
use tracing::warn;

use output::ErrorRecord;

fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        return fail(ErrorRecord::new(format!("{:#}", e)));
    }
    logging::install_panic_hook();

    // Informational only; a closed stderr must not stop the analysis
    let _ = output::write_diagnostics(io::stderr().lock());

    let mut args = std::env::args_os().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        return fail(ErrorRecord::new("No audio file path provided."));
    };
    let extra = args.count();
    if extra > 0 {
        warn!(extra, "ignoring extra arguments");
    }

    let report = match run_guarded(&path) {
        Ok(report) => report,
        Err(e) => return fail(ErrorRecord::for_file(format!("{:#}", e), &path)),
    };

    match output::write_report(io::stdout().lock(), &report) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(ErrorRecord::for_file(
            format!("failed to write result: {}", e),
            &path,
        )),
    }
}

/// Decode the file and analyze it
fn run(path: &Path) -> anyhow::Result<TrackReport> {
    let waveform = TrackLoader::new()
        .load(path)
        .with_context(|| format!("failed to decode {}", path.display()))?;

    let analyzer = TrackAnalyzer::new(AnalysisConfig::default())?;
    let report = analyzer
        .analyze(&waveform)
        .with_context(|| format!("failed to analyze {}", path.display()))?;

    Ok(report)
}

/// `run`, with panics turned into errors
fn run_guarded(path: &Path) -> anyhow::Result<TrackReport> {
    match panic::catch_unwind(|| run(path)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(anyhow!("analysis panicked: {}", message))
        }
    }
}

fn fail(record: ErrorRecord) -> ExitCode {
    let _ = output::write_error(io::stderr().lock(), &record);
    ExitCode::FAILURE
}
