use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// An installed Piper model. List position decides which voice the male and
/// female choices map onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInfo {
    pub id: String,
    pub label: String,
    pub language: Option<String>,
    pub quality: Option<String>,
    pub model_path: String,
    pub config_path: Option<String>,
}

/// The part of Piper's `<model>.onnx.json` used for labelling.
#[derive(Debug, Default, Deserialize)]
struct ModelConfig {
    language: Option<LanguageConfig>,
    audio: Option<AudioConfig>,
}

#[derive(Debug, Deserialize)]
struct LanguageConfig {
    code: Option<String>,
    name_english: Option<String>,
    name_native: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AudioConfig {
    quality: Option<String>,
}

impl VoiceInfo {
    fn from_model(model: &Path) -> Option<Self> {
        let id = model.file_stem()?.to_string_lossy().to_string();
        let config_path = config_path_for(model);
        let config = config_path
            .as_deref()
            .and_then(read_config)
            .unwrap_or_default();

        let language = config.language.as_ref();
        let name = language
            .and_then(|lang| lang.name_english.as_ref().or(lang.name_native.as_ref()));
        let label = match name {
            Some(name) => format!("{name} · {id}"),
            None => id.clone(),
        };

        Some(Self {
            label,
            language: language.and_then(|lang| lang.code.clone()),
            quality: config.audio.and_then(|audio| audio.quality),
            model_path: model.to_string_lossy().to_string(),
            config_path: config_path.map(|path| path.to_string_lossy().to_string()),
            id,
        })
    }
}

fn config_path_for(model: &Path) -> Option<PathBuf> {
    let mut path = model.to_path_buf();
    path.set_extension("onnx.json");
    path.exists().then_some(path)
}

fn read_config(path: &Path) -> Option<ModelConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|err| warn!("Failed to read voice config {}: {err}", path.display()))
        .ok()?;
    serde_json::from_str(&contents)
        .map_err(|err| warn!("Failed to parse voice config {}: {err}", path.display()))
        .ok()
}

/// Every `*.onnx` model below `root`, sorted by label then id.
fn scan(root: &Path) -> Vec<VoiceInfo> {
    if !root.exists() {
        debug!("Voice directory {} does not exist", root.display());
        return Vec::new();
    }
    let mut voices: Vec<VoiceInfo> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("onnx"))
        .filter_map(|entry| VoiceInfo::from_model(entry.path()))
        .collect();
    voices.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    voices
}

/// Piper voice models installed under a directory. The list is rescanned on
/// [`VoiceLibrary::refresh`], so models added while the app runs show up.
#[derive(Default)]
pub struct VoiceLibrary {
    root: PathBuf,
    voices: RwLock<Vec<VoiceInfo>>,
}

impl VoiceLibrary {
    pub fn new(root: PathBuf) -> Self {
        let voices = scan(&root);
        Self {
            root,
            voices: RwLock::new(voices),
        }
    }

    /// Rescans the directory and returns how many voices were found.
    pub fn refresh(&self) -> usize {
        let voices = scan(&self.root);
        let count = voices.len();
        let previous = std::mem::replace(&mut *self.voices.write(), voices).len();
        if previous != count {
            info!(
                "Voice library under {} changed: {previous} -> {count} voices",
                self.root.display()
            );
        }
        count
    }

    pub fn list(&self) -> Vec<VoiceInfo> {
        self.voices.read().clone()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
