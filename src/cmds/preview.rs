use log::{info, warn};

use super::{CommandError, Reply, ERROR_RANGE};
use crate::{
    session::{RangeError, Session},
    speech::{Speed, VoiceChoice},
    view::Notice,
};

impl From<RangeError> for CommandError {
    fn from(value: RangeError) -> Self {
        let details = match value {
            RangeError::Inverted { first, last } => Some(format!("pages {first} - {last}")),
            RangeError::NoDocument | RangeError::NoPages => None,
        };
        CommandError::new(ERROR_RANGE, value.to_string(), details)
    }
}

/// Loads pages `start..=end` (1-based) into the preview.
pub fn load_selection(mut session: Session, start: usize, end: usize) -> Reply {
    match session.select_pages(start, end) {
        Ok(selection) => {
            info!(
                "Loaded pages {}-{} into preview",
                selection.first_page(),
                selection.last_page()
            );
            let message = format!(
                "Loaded pages {} - {}",
                selection.first_page(),
                selection.last_page()
            );
            Reply::render(session, vec![Notice::success(message)])
        }
        Err(err) => {
            warn!("Rejected page selection {start}-{end}: {err}");
            let mut reply = Reply::render(session, Vec::new());
            let error = CommandError::from(err);
            reply.view.notices.push(Notice::warning(error.message.clone()));
            reply.view.error = Some(error);
            reply
        }
    }
}

pub fn edit(mut session: Session, text: String) -> Reply {
    session.edit(text);
    Reply::render(session, Vec::new())
}

pub fn choose_voice(mut session: Session, voice: VoiceChoice) -> Reply {
    session.voice = voice;
    Reply::render(session, vec![Notice::info(format!("Voice: {}", voice.label()))])
}

pub fn choose_speed(mut session: Session, speed: Speed) -> Reply {
    session.speed = speed;
    Reply::render(session, vec![Notice::info(format!("Speed: {}", speed.label()))])
}

/// Re-renders the session, reporting the preview metrics when there is text.
pub fn show(session: Session) -> Reply {
    let mut reply = Reply::render(session, Vec::new());
    if !reply.view.preview.is_empty() {
        let summary = reply.view.metrics.summary();
        reply.view.notices.push(Notice::info(summary));
    }
    reply
}

/// Empties the preview; rendering refills it from the document, if any.
pub fn reset_preview(mut session: Session) -> Reply {
    session.reset_preview();
    Reply::render(session, Vec::new())
}

pub fn clear_all() -> Reply {
    info!("Session cleared");
    Reply::render(Session::default(), Vec::new())
}
