use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    document::{PdfExtractor, TextExtractor},
    speech::{encode, PiperEngine, SpeechEngine, VoiceLibrary},
    util::{command::ExternalCommand, piper_path},
};

/// Start-up configuration, read from `ECHOVERSE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub voices_dir: PathBuf,
    pub default_voice: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub runtime_dir: PathBuf,
    pub piper_command: Option<String>,
    pub ffmpeg_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let path_or = |key: &str, default: &str| {
            var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            voices_dir: path_or("ECHOVERSE_VOICES_DIR", "assets/voices"),
            default_voice: var("ECHOVERSE_DEFAULT_VOICE").map(PathBuf::from),
            output_dir: path_or("ECHOVERSE_OUTPUT_DIR", "runtime/output"),
            temp_dir: var("ECHOVERSE_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            runtime_dir: path_or("ECHOVERSE_RUNTIME_DIR", "runtime"),
            piper_command: var("ECHOVERSE_PIPER_COMMAND"),
            ffmpeg_path: var("ECHOVERSE_FFMPEG_PATH").map(PathBuf::from),
        }
    }
}

pub struct AppState {
    pub settings: Settings,
    pub extractor: Box<dyn TextExtractor>,
    pub engine: Box<dyn SpeechEngine>,
}

impl AppState {
    pub fn initialise() -> Result<Self> {
        Self::from_settings(Settings::from_env())
    }

    pub fn from_settings(settings: Settings) -> Result<Self> {
        let piper = piper_path::resolve(settings.piper_command.as_deref(), &settings.runtime_dir)
            .context("unable to locate Piper")?;
        let ffmpeg = encode::locate_ffmpeg(settings.ffmpeg_path.as_deref());
        if ffmpeg.is_none() {
            warn!("ffmpeg not found; conversions will produce WAV audio");
        }

        let voices = VoiceLibrary::new(settings.voices_dir.clone());
        info!(
            "{} voices available in {}",
            voices.list().len(),
            voices.root().display()
        );

        let engine = PiperEngine::new(
            voices,
            settings.default_voice.clone(),
            piper,
            ffmpeg.map(ExternalCommand::from),
        );
        Self::with_components(settings, Box::new(PdfExtractor), Box::new(engine))
    }

    pub fn with_components(
        settings: Settings,
        extractor: Box<dyn TextExtractor>,
        engine: Box<dyn SpeechEngine>,
    ) -> Result<Self> {
        fs::create_dir_all(&settings.output_dir).with_context(|| {
            format!(
                "unable to create output directory {}",
                settings.output_dir.display()
            )
        })?;
        Ok(Self {
            settings,
            extractor,
            engine,
        })
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.settings.output_dir.join(filename)
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.settings.temp_dir
    }
}
