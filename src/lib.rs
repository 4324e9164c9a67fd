//! EchoVerse turns text-bearing PDFs into spoken audio.
//!
//! The pipeline is: extract per-page text ([`document`]), narrow and edit it
//! in a [`session::Session`], then synthesize it through a
//! [`speech::SpeechEngine`]. [`cmds`] exposes one handler per user action.

pub mod cmds;
pub mod console;
pub mod document;
pub mod metrics;
pub mod session;
pub mod speech;
pub mod state;
pub mod util;
pub mod view;
