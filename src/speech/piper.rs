use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::Stdio,
    thread,
};

use log::{debug, error, info, warn};

use super::{
    encode, AudioFormat, SpeechEngine, SynthesisError, SynthesisJob, VoiceInfo, VoiceLibrary,
};
use crate::util::command::ExternalCommand;

/// Piper's natural speaking rate. Rates map onto `--length_scale` inversely.
pub const DEFAULT_RATE: f32 = 1.0;

pub struct PiperEngine {
    library: VoiceLibrary,
    default_model: Option<PathBuf>,
    piper: ExternalCommand,
    ffmpeg: Option<ExternalCommand>,
}

impl PiperEngine {
    pub fn new(
        library: VoiceLibrary,
        default_model: Option<PathBuf>,
        piper: ExternalCommand,
        ffmpeg: Option<ExternalCommand>,
    ) -> Self {
        Self {
            library,
            default_model,
            piper,
            ffmpeg,
        }
    }

    fn model_for(&self, voice: Option<&VoiceInfo>) -> Result<PathBuf, SynthesisError> {
        let model = voice
            .map(|voice| PathBuf::from(&voice.model_path))
            .or_else(|| self.default_model.clone())
            .ok_or(SynthesisError::NoVoice)?;
        if !model.exists() {
            return Err(SynthesisError::VoiceNotFound(model));
        }
        Ok(model)
    }

    fn run_piper(
        &self,
        model: &Path,
        length_scale: f32,
        text: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let mut command = self.piper.to_command();
        command
            .arg("--model")
            .arg(model)
            .arg("--output_file")
            .arg(output)
            .arg("--length_scale")
            .arg(length_scale.to_string());

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SynthesisError::Spawn)?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SynthesisError::Other("Failed to access Piper stdin".into()))?;

        // Piper logs to stderr while it reads, so stdin is fed from its own
        // thread while this one drains stderr.
        let (written, result) = thread::scope(|scope| {
            let writer = scope.spawn(move || {
                let written = stdin.write_all(text.as_bytes());
                drop(stdin);
                written
            });
            let result = child.wait_with_output();
            let written = writer.join().unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::Other, "Piper stdin writer panicked"))
            });
            (written, result)
        });
        let result = result.map_err(|err| SynthesisError::Other(err.to_string()))?;
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();

        if !result.status.success() {
            let status = result.status.code().unwrap_or_default();
            error!("Piper command exited with status {status}: {stderr}");
            return Err(SynthesisError::PiperFailure { status, stderr });
        }
        match written {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                warn!("Piper closed its input before reading all text: {err}");
            }
            Err(err) => {
                return Err(SynthesisError::Other(format!(
                    "unable to send text to Piper: {err}"
                )))
            }
        }
        if !stderr.is_empty() {
            debug!("Piper stderr: {stderr}");
        }
        Ok(())
    }
}

impl SpeechEngine for PiperEngine {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.library.list()
    }

    fn refresh_voices(&self) -> Vec<VoiceInfo> {
        self.library.refresh();
        self.library.list()
    }

    fn default_rate(&self) -> f32 {
        DEFAULT_RATE
    }

    fn synthesize(
        &self,
        job: &SynthesisJob<'_>,
        output: &Path,
    ) -> Result<AudioFormat, SynthesisError> {
        let model = self.model_for(job.voice)?;
        if job.rate <= 0.0 {
            return Err(SynthesisError::Other(format!("invalid speech rate {}", job.rate)));
        }
        let length_scale = 1.0 / job.rate;
        info!(
            "Invoking Piper with model {} (length_scale {length_scale})",
            model.display()
        );

        let Some(ffmpeg) = &self.ffmpeg else {
            warn!("ffmpeg not available, returning the WAV produced by Piper");
            self.run_piper(&model, length_scale, job.text, output)?;
            return Ok(AudioFormat::Wav);
        };

        let scratch_dir = output.parent().unwrap_or_else(|| Path::new("."));
        let wav = tempfile::Builder::new()
            .prefix("echoverse-")
            .suffix(".wav")
            .tempfile_in(scratch_dir)
            .map_err(|err| SynthesisError::Other(err.to_string()))?
            .into_temp_path();
        self.run_piper(&model, length_scale, job.text, &wav)?;
        encode::wav_to_mp3(ffmpeg, &wav, output)?;

        if let Err(err) = wav.close() {
            warn!("Unable to remove intermediate WAV: {err}");
        }
        Ok(AudioFormat::Mp3)
    }
}
