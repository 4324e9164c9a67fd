use log::{error, info};

use super::{CommandError, Reply, ERROR_EXTRACTION};
use crate::{document::ExtractionError, session::Session, state::AppState, view::Notice};

impl From<ExtractionError> for CommandError {
    fn from(value: ExtractionError) -> Self {
        CommandError::new(
            ERROR_EXTRACTION,
            format!("Could not read PDF. Error: {value}"),
            None,
        )
    }
}

/// Replaces the session document with the extracted upload. A failed
/// extraction leaves the session without a document.
pub fn upload(state: &AppState, mut session: Session, name: &str, bytes: &[u8]) -> Reply {
    info!("Importing {name} ({} bytes)", bytes.len());
    match state.extractor.extract(bytes) {
        Ok(document) => {
            let pages = document.page_count();
            session.document = Some(document);
            Reply::render(session, vec![Notice::success(format!("Loaded {pages} pages"))])
        }
        Err(err) => {
            error!("Import of {name} failed: {err}");
            session.document = None;
            let mut reply = Reply::render(session, Vec::new());
            reply.view = reply.view.with_error(err.into());
            reply
        }
    }
}
