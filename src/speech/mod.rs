//! Text to speech conversion.
//!
//! [`convert`] is the single entry point used by both the "convert preview" and
//! "convert full document" actions. It validates the text, resolves the voice
//! and rate against a [`SpeechEngine`], lets the engine render into a transient
//! file and hands the bytes back as an [`AudioClip`].

pub mod encode;
pub mod piper;
pub mod voices;

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
    time::Instant,
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use piper::PiperEngine;
pub use voices::{VoiceInfo, VoiceLibrary};

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no voice model is installed")]
    NoVoice,
    #[error("voice model not found at {0}")]
    VoiceNotFound(PathBuf),
    #[error("failed to spawn Piper process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Piper exited with status {status}: {stderr}")]
    PiperFailure { status: i32, stderr: String },
    #[error("ffmpeg failed: {0}")]
    Encode(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No text to convert.")]
    EmptyInput,
    #[error("Conversion failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("Conversion failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceChoice {
    #[default]
    Male,
    Female,
}

impl VoiceChoice {
    pub const ALL: [VoiceChoice; 2] = [VoiceChoice::Male, VoiceChoice::Female];

    pub fn label(self) -> &'static str {
        match self {
            VoiceChoice::Male => "Male",
            VoiceChoice::Female => "Female",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|choice| choice.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Male takes the first installed voice and Female the second. `None`
    /// leaves the engine on its default voice, which is also what Female
    /// falls back to when fewer than two voices are installed.
    pub fn pick(self, voices: &[VoiceInfo]) -> Option<&VoiceInfo> {
        match self {
            VoiceChoice::Male => voices.first(),
            VoiceChoice::Female => voices.get(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speed {
    VerySlow,
    Slow,
    #[default]
    Normal,
    Fast,
    Faster,
    Turbo,
}

impl Speed {
    pub const ALL: [Speed; 6] = [
        Speed::VerySlow,
        Speed::Slow,
        Speed::Normal,
        Speed::Fast,
        Speed::Faster,
        Speed::Turbo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Speed::VerySlow => "0.5x Very Slow",
            Speed::Slow => "0.75x Slow",
            Speed::Normal => "1x Normal",
            Speed::Fast => "1.25x Fast",
            Speed::Faster => "1.5x Faster",
            Speed::Turbo => "2x Turbo",
        }
    }

    pub fn multiplier(self) -> f32 {
        match self {
            Speed::VerySlow => 0.5,
            Speed::Slow => 0.75,
            Speed::Normal => 1.0,
            Speed::Fast => 1.25,
            Speed::Faster => 1.5,
            Speed::Turbo => 2.0,
        }
    }

    /// Accepts a full label in any case, its leading token (`"2x"`) or the
    /// bare multiplier (`"2"`, `"0.75"`).
    pub fn lookup(input: &str) -> Option<Self> {
        let input = input.trim();
        let numeric = input
            .trim_end_matches(['x', 'X'])
            .parse::<f32>()
            .ok();
        Self::ALL.into_iter().find(|speed| {
            let label = speed.label();
            label.eq_ignore_ascii_case(input)
                || label
                    .split_whitespace()
                    .next()
                    .is_some_and(|token| token.eq_ignore_ascii_case(input))
                || numeric.is_some_and(|value| value == speed.multiplier())
        })
    }

    pub fn effective_rate(self, default_rate: f32) -> f32 {
        default_rate * self.multiplier()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub text: String,
    pub voice: VoiceChoice,
    pub speed: Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mp3",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub format: AudioFormat,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    /// Reader positioned at the start of the clip, ready for playback.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.bytes.as_slice())
    }
}

/// Parameters handed to an engine for a single synthesis run.
#[derive(Debug)]
pub struct SynthesisJob<'a> {
    pub text: &'a str,
    pub voice: Option<&'a VoiceInfo>,
    pub rate: f32,
}

pub trait SpeechEngine {
    /// Installed voices in a stable order.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Rescans for installed voices before listing them. Engines with a
    /// fixed voice set just list.
    fn refresh_voices(&self) -> Vec<VoiceInfo> {
        self.voices()
    }

    fn default_rate(&self) -> f32;

    /// Renders `job` into `output`, returning the format actually written.
    fn synthesize(&self, job: &SynthesisJob<'_>, output: &Path)
        -> Result<AudioFormat, SynthesisError>;
}

pub fn convert<E>(
    engine: &E,
    request: &ConversionRequest,
    temp_dir: &Path,
) -> Result<AudioClip, ConvertError>
where
    E: SpeechEngine + ?Sized,
{
    if request.text.trim().is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let voices = engine.voices();
    let voice = request.voice.pick(&voices);
    let rate = request.speed.effective_rate(engine.default_rate());
    debug!(
        "Voice {:?} resolved to {:?}, rate {rate}",
        request.voice,
        voice.map(|voice| voice.id.as_str())
    );

    let transient = tempfile::Builder::new()
        .prefix("echoverse-")
        .suffix(".audio")
        .tempfile_in(temp_dir)?
        .into_temp_path();

    let start = Instant::now();
    let job = SynthesisJob {
        text: &request.text,
        voice,
        rate,
    };
    let format = engine.synthesize(&job, &transient)?;
    let bytes = fs::read(&transient)?;

    if let Err(err) = transient.close() {
        warn!("Unable to remove transient audio file: {err}");
    }

    info!(
        "Synthesized {} bytes of {} in {} ms",
        bytes.len(),
        format.extension(),
        start.elapsed().as_millis()
    );
    Ok(AudioClip { format, bytes })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    pub fn voice(id: &str) -> VoiceInfo {
        VoiceInfo {
            id: id.to_string(),
            label: id.to_string(),
            language: None,
            quality: None,
            model_path: format!("{id}.onnx"),
            config_path: None,
        }
    }

    /// Records every job and writes a fixed payload, or fails on demand.
    pub struct StubEngine {
        pub voices: Vec<VoiceInfo>,
        pub default_rate: f32,
        pub fail: bool,
        pub piper_stderr: Option<String>,
        pub calls: RefCell<Vec<(String, Option<String>, f32, PathBuf)>>,
    }

    impl StubEngine {
        pub fn new(voices: Vec<VoiceInfo>) -> Self {
            Self {
                voices,
                default_rate: 200.0,
                fail: false,
                piper_stderr: None,
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new())
            }
        }

        /// Fails the way a crashing Piper process does.
        pub fn crashing(stderr: &str) -> Self {
            Self {
                piper_stderr: Some(stderr.to_string()),
                ..Self::new(Vec::new())
            }
        }

        pub fn last_call(&self) -> (String, Option<String>, f32, PathBuf) {
            self.calls.borrow().last().cloned().expect("engine was called")
        }
    }

    impl SpeechEngine for StubEngine {
        fn voices(&self) -> Vec<VoiceInfo> {
            self.voices.clone()
        }

        fn default_rate(&self) -> f32 {
            self.default_rate
        }

        fn synthesize(
            &self,
            job: &SynthesisJob<'_>,
            output: &Path,
        ) -> Result<AudioFormat, SynthesisError> {
            self.calls.borrow_mut().push((
                job.text.to_string(),
                job.voice.map(|voice| voice.id.clone()),
                job.rate,
                output.to_path_buf(),
            ));
            if self.fail {
                return Err(SynthesisError::Other("engine exploded".into()));
            }
            if let Some(stderr) = &self.piper_stderr {
                return Err(SynthesisError::PiperFailure {
                    status: 1,
                    stderr: stderr.clone(),
                });
            }
            fs::write(output, format!("MP3:{}", job.text))
                .map_err(|err| SynthesisError::Other(err.to_string()))?;
            Ok(AudioFormat::Mp3)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::testing::{voice, StubEngine};
    use super::*;

    fn request(text: &str, voice: VoiceChoice, speed: Speed) -> ConversionRequest {
        ConversionRequest {
            text: text.to_string(),
            voice,
            speed,
        }
    }

    #[test]
    fn blank_text_is_rejected_without_synthesis() {
        let temp = tempfile::tempdir().unwrap();
        let engine = StubEngine::new(vec![voice("a")]);
        for text in ["", "   ", "\n\t "] {
            let result = convert(&engine, &request(text, VoiceChoice::Male, Speed::Normal), temp.path());
            assert!(matches!(result, Err(ConvertError::EmptyInput)));
        }
        assert!(engine.calls.borrow().is_empty());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn returns_audio_and_removes_transient_file() {
        let temp = tempfile::tempdir().unwrap();
        let engine = StubEngine::new(vec![voice("a")]);
        let clip = convert(&engine, &request("hola", VoiceChoice::Male, Speed::Normal), temp.path())
            .unwrap();

        assert_eq!(clip.format, AudioFormat::Mp3);
        let mut played = String::new();
        clip.reader().read_to_string(&mut played).unwrap();
        assert_eq!(played, "MP3:hola");

        let (_, _, _, transient) = engine.last_call();
        assert!(transient.starts_with(temp.path()));
        assert!(!transient.exists());
    }

    #[test]
    fn failure_carries_cause_and_removes_transient_file() {
        let temp = tempfile::tempdir().unwrap();
        let engine = StubEngine::failing();
        let err = convert(&engine, &request("hola", VoiceChoice::Male, Speed::Normal), temp.path())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Synthesis(_)));
        assert_eq!(err.to_string(), "Conversion failed: engine exploded");

        let (_, _, _, transient) = engine.last_call();
        assert!(!transient.exists());
    }

    #[test]
    fn unwritable_temp_dir_is_a_conversion_error() {
        let engine = StubEngine::new(vec![]);
        let err = convert(
            &engine,
            &request("hola", VoiceChoice::Male, Speed::Normal),
            Path::new("/definitely/not/here"),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn speed_scales_engine_default_rate() {
        let temp = tempfile::tempdir().unwrap();
        let engine = StubEngine::new(vec![]);

        convert(&engine, &request("hola", VoiceChoice::Male, Speed::Turbo), temp.path()).unwrap();
        assert_eq!(engine.last_call().2, 2.0 * engine.default_rate);

        convert(&engine, &request("hola", VoiceChoice::Male, Speed::Normal), temp.path()).unwrap();
        assert_eq!(engine.last_call().2, engine.default_rate);
    }

    #[test]
    fn labels_map_to_multipliers() {
        let expected = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];
        for (speed, multiplier) in Speed::ALL.into_iter().zip(expected) {
            assert_eq!(Speed::lookup(speed.label()), Some(speed));
            assert_eq!(speed.multiplier(), multiplier);
        }
        assert_eq!(Speed::lookup("warp speed"), None);
    }

    #[test]
    fn lookup_accepts_short_forms() {
        assert_eq!(Speed::lookup("2x"), Some(Speed::Turbo));
        assert_eq!(Speed::lookup("0.75"), Some(Speed::Slow));
        assert_eq!(Speed::lookup("1.25x fast"), Some(Speed::Fast));
        assert_eq!(Speed::lookup("3x"), None);
    }

    #[test]
    fn voice_choice_uses_list_position() {
        let voices = vec![voice("first"), voice("second")];
        assert_eq!(VoiceChoice::Male.pick(&voices).unwrap().id, "first");
        assert_eq!(VoiceChoice::Female.pick(&voices).unwrap().id, "second");
    }

    #[test]
    fn female_falls_back_to_engine_default() {
        let temp = tempfile::tempdir().unwrap();
        let engine = StubEngine::new(vec![voice("only")]);
        convert(&engine, &request("hola", VoiceChoice::Female, Speed::Normal), temp.path())
            .unwrap();
        assert_eq!(engine.last_call().1, None);

        let none = StubEngine::new(vec![]);
        convert(&none, &request("hola", VoiceChoice::Male, Speed::Normal), temp.path()).unwrap();
        assert_eq!(none.last_call().1, None);
    }
}
