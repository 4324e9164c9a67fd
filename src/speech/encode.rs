use std::path::{Path, PathBuf};

use log::{error, info};

use super::SynthesisError;
use crate::util::command::ExternalCommand;

/// Picks the ffmpeg binary: the configured path when it exists, otherwise
/// whatever `ffmpeg` resolves to on `PATH`.
pub fn locate_ffmpeg(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(candidate) = configured {
        if candidate.exists() {
            return Some(candidate.to_path_buf());
        }
        error!(
            "Configured ffmpeg {} does not exist, searching PATH",
            candidate.display()
        );
    }
    which::which("ffmpeg").ok()
}

/// Re-encodes `source` (WAV) into mono 22.05 kHz MP3 at `target`.
pub fn wav_to_mp3(
    ffmpeg: &ExternalCommand,
    source: &Path,
    target: &Path,
) -> Result<(), SynthesisError> {
    info!("Encoding WAV to MP3 with ffmpeg");
    let output = ffmpeg
        .to_command()
        .arg("-y")
        .arg("-i")
        .arg(source)
        .args(["-vn", "-ar", "22050", "-ac", "1", "-f", "mp3"])
        .arg(target)
        .output()
        .map_err(|err| SynthesisError::Encode(err.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!("ffmpeg exited with {}: {stderr}", output.status);
        return Err(SynthesisError::Encode(format!(
            "exited with {}: {stderr}",
            output.status
        )));
    }
    Ok(())
}
