use log::{error, info};

use super::{CommandError, Reply, ERROR_CONVERSION, ERROR_EMPTY_INPUT};
use crate::{
    session::Session,
    speech::{self, ConversionRequest, ConvertError, SynthesisError},
    state::AppState,
    view::{AudioDownload, Notice},
};

impl From<ConvertError> for CommandError {
    fn from(value: ConvertError) -> Self {
        match value {
            ConvertError::EmptyInput => CommandError::new(ERROR_EMPTY_INPUT, value.to_string(), None),
            ConvertError::Synthesis(SynthesisError::PiperFailure { status, stderr }) => {
                let details = (!stderr.is_empty()).then_some(stderr);
                CommandError::new(
                    ERROR_CONVERSION,
                    format!("Conversion failed: Piper exited with status {status}"),
                    details,
                )
            }
            ConvertError::Synthesis(_) | ConvertError::Io(_) => {
                CommandError::new(ERROR_CONVERSION, value.to_string(), None)
            }
        }
    }
}

/// Converts the edited preview text.
pub fn convert_preview(state: &AppState, session: Session) -> Reply {
    let request = session.preview_request();
    run(state, session, &request, "preview", "Preview converted!")
}

/// Converts the full extracted text, ignoring any edits.
pub fn convert_full(state: &AppState, session: Session) -> Reply {
    let request = session.full_request();
    run(state, session, &request, "full", "Full document converted!")
}

fn run(
    state: &AppState,
    session: Session,
    request: &ConversionRequest,
    stem: &str,
    success: &str,
) -> Reply {
    info!(
        "Converting {stem} text ({} chars, voice {}, speed {})",
        request.text.chars().count(),
        request.voice.label(),
        request.speed.label()
    );
    match speech::convert(&*state.engine, request, state.temp_dir()) {
        Ok(clip) => {
            let mut reply = Reply::render(session, vec![Notice::success(success)]);
            reply.view = reply.view.with_download(AudioDownload::new(stem, clip));
            reply
        }
        Err(err) => {
            error!("Conversion of {stem} failed: {err}");
            let mut reply = Reply::render(session, Vec::new());
            reply.view = reply.view.with_error(err.into());
            reply
        }
    }
}
