//! Rendering instructions returned by every command handler.

use std::{fs, path::Path};

use serde::Serialize;

use crate::{
    cmds::CommandError,
    metrics::TextMetrics,
    session::Session,
    speech::{AudioClip, Speed, VoiceChoice},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl From<&CommandError> for Notice {
    fn from(error: &CommandError) -> Self {
        match &error.details {
            Some(details) => Notice::error(format!("{} ({details})", error.message)),
            None => Notice::error(error.message.clone()),
        }
    }
}

/// A converted clip offered for playback and download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioDownload {
    pub file_name: String,
    pub mime: &'static str,
    #[serde(skip)]
    pub clip: AudioClip,
}

impl AudioDownload {
    pub fn new(stem: &str, clip: AudioClip) -> Self {
        Self {
            file_name: format!("{stem}.{}", clip.format.extension()),
            mime: clip.format.mime(),
            clip,
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, &self.clip.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub notices: Vec<Notice>,
    pub error: Option<CommandError>,
    pub page_count: Option<usize>,
    pub preview: String,
    pub metrics: TextMetrics,
    pub advisory: Option<String>,
    pub voice: VoiceChoice,
    pub speed: Speed,
    pub download: Option<AudioDownload>,
}

impl View {
    /// Renders the session, seeding an empty preview from the document first.
    pub fn render(session: &mut Session, notices: Vec<Notice>) -> Self {
        session.seed_preview();
        let metrics = TextMetrics::of(&session.working_text);
        Self {
            notices,
            error: None,
            page_count: session.document.as_ref().map(|doc| doc.page_count()),
            preview: session.working_text.clone(),
            metrics,
            advisory: metrics
                .is_large()
                .then(|| "Large text detected. Consider splitting into smaller parts.".to_string()),
            voice: session.voice,
            speed: session.speed,
            download: None,
        }
    }

    pub fn with_error(mut self, error: CommandError) -> Self {
        self.notices.push(Notice::from(&error));
        self.error = Some(error);
        self
    }

    pub fn with_download(mut self, download: AudioDownload) -> Self {
        self.download = Some(download);
        self
    }
}
