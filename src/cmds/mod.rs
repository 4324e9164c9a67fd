//! Event handlers bridging the front end with the pipeline.
//!
//! Each user action is an [`Event`]. [`dispatch`] takes the current
//! [`Session`], applies the event and returns the updated session together
//! with the [`View`] to render. Failures never escape a handler; they are
//! reported through the view and the session stays usable.

pub mod convert;
pub mod import_pdf;
pub mod preview;

use log::debug;
use serde::Serialize;

use crate::{
    session::Session,
    speech::{Speed, VoiceChoice},
    state::AppState,
    view::View,
};

pub const ERROR_EXTRACTION: &str = "EXTRACTION_FAILED";
pub const ERROR_RANGE: &str = "RANGE_INVALID";
pub const ERROR_EMPTY_INPUT: &str = "EMPTY_INPUT";
pub const ERROR_CONVERSION: &str = "CONVERSION_FAILED";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl CommandError {
    pub fn new(code: &str, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Upload { name: String, bytes: Vec<u8> },
    LoadSelection { start: usize, end: usize },
    Edit(String),
    ChooseVoice(VoiceChoice),
    ChooseSpeed(Speed),
    ConvertPreview,
    ConvertFull,
    ResetPreview,
    ClearAll,
    Refresh,
}

#[derive(Debug)]
pub struct Reply {
    pub session: Session,
    pub view: View,
}

impl Reply {
    pub fn render(mut session: Session, notices: Vec<crate::view::Notice>) -> Self {
        let view = View::render(&mut session, notices);
        Self { session, view }
    }
}

pub fn dispatch(state: &AppState, session: Session, event: Event) -> Reply {
    debug!("Handling {}", event_name(&event));
    match event {
        Event::Upload { name, bytes } => import_pdf::upload(state, session, &name, &bytes),
        Event::LoadSelection { start, end } => preview::load_selection(session, start, end),
        Event::Edit(text) => preview::edit(session, text),
        Event::ChooseVoice(voice) => preview::choose_voice(session, voice),
        Event::ChooseSpeed(speed) => preview::choose_speed(session, speed),
        Event::ConvertPreview => convert::convert_preview(state, session),
        Event::ConvertFull => convert::convert_full(state, session),
        Event::ResetPreview => preview::reset_preview(session),
        Event::ClearAll => preview::clear_all(),
        Event::Refresh => preview::show(session),
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Upload { .. } => "upload",
        Event::LoadSelection { .. } => "load selection",
        Event::Edit(_) => "edit",
        Event::ChooseVoice(_) => "choose voice",
        Event::ChooseSpeed(_) => "choose speed",
        Event::ConvertPreview => "convert preview",
        Event::ConvertFull => "convert full",
        Event::ResetPreview => "reset preview",
        Event::ClearAll => "clear all",
        Event::Refresh => "refresh",
    }
}
