use std::path::Path;

use log::debug;
use thiserror::Error;

use super::command::ExternalCommand;

#[derive(Debug, Error)]
pub enum PiperPathError {
    #[error("the configured Piper command is empty or malformed: {0:?}")]
    InvalidOverride(String),
    #[error("no piper executable in {0} and python is not on PATH")]
    Unavailable(String),
}

/// Finds how to launch Piper: an explicit command line, the bundled
/// executable under `runtime/piper`, or `python -m piper`.
pub fn resolve(
    override_command: Option<&str>,
    runtime_dir: &Path,
) -> Result<ExternalCommand, PiperPathError> {
    if let Some(raw) = override_command {
        return ExternalCommand::parse(raw)
            .ok_or_else(|| PiperPathError::InvalidOverride(raw.to_string()));
    }

    let candidate =
        runtime_dir
            .join("piper")
            .join(if cfg!(windows) { "piper.exe" } else { "piper" });
    if candidate.exists() {
        debug!("Using bundled Piper at {}", candidate.display());
        return Ok(ExternalCommand::from(candidate));
    }

    for python in ["python3", "python"] {
        if which::which(python).is_ok() {
            debug!("Falling back to {python} -m piper");
            return Ok(ExternalCommand::with_args(python, ["-m", "piper"]));
        }
    }

    Err(PiperPathError::Unavailable(runtime_dir.display().to_string()))
}
