//! Line-driven terminal front end.
//!
//! Reads one command per line, turns it into an [`Event`] and prints the
//! resulting [`View`]. Converted audio is written to the output directory
//! under its download name.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use log::{error, info, warn};

use crate::{
    cmds::{dispatch, Event},
    session::Session,
    speech::{Speed, VoiceChoice},
    state::AppState,
    view::{NoticeLevel, View},
};

const HELP: &str = "\
Commands:
  open <path>            upload a PDF
  pages <start> <end>    load pages start..=end into the preview
  edit                   replace the preview; finish with a line containing only '.'
  show                   print the preview and its metrics
  voice <male|female>    choose the voice
  speed <choice>         0.5x, 0.75x, 1x, 1.25x, 1.5x or 2x
  convert <preview|full> synthesize audio into the output directory
  voices                 list installed voices
  reset                  reset the preview text
  clear                  clear the whole session
  help                   show this message
  quit                   leave";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Event(Event),
    Open(String),
    Speed(String),
    Edit,
    Show,
    Voices,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let input = match (command.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("open", [_, ..]) => Input::Open(rest.join(" ")),
        ("pages", [start, end]) => {
            let start = start
                .parse()
                .map_err(|_| format!("'{start}' is not a page number"))?;
            let end = end
                .parse()
                .map_err(|_| format!("'{end}' is not a page number"))?;
            Input::Event(Event::LoadSelection { start, end })
        }
        ("edit", []) => Input::Edit,
        ("show", []) => Input::Show,
        ("voice", [choice]) => VoiceChoice::from_label(choice)
            .map(|voice| Input::Event(Event::ChooseVoice(voice)))
            .ok_or_else(|| format!("unknown voice '{choice}'"))?,
        ("speed", [_, ..]) => Input::Speed(rest.join(" ")),
        ("convert", ["preview"]) => Input::Event(Event::ConvertPreview),
        ("convert", ["full"]) => Input::Event(Event::ConvertFull),
        ("voices", []) => Input::Voices,
        ("reset", []) => Input::Event(Event::ResetPreview),
        ("clear", []) => Input::Event(Event::ClearAll),
        ("help", []) => Input::Help,
        ("quit" | "exit", []) => Input::Quit,
        _ => return Err(format!("unrecognised command '{}', try 'help'", line.trim())),
    };
    Ok(Some(input))
}

/// Collects edit lines until a lone `.` or end of input.
fn read_block<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "." {
            break;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines.join("\n"))
}

fn print_view<W: Write>(out: &mut W, state: &AppState, view: &View, full: bool) -> io::Result<()> {
    for notice in &view.notices {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        writeln!(out, "[{tag}] {}", notice.message)?;
    }

    if let Some(download) = &view.download {
        let path = state.output_path(&download.file_name);
        match download.save_to(&path) {
            Ok(()) => writeln!(
                out,
                "[ok] Saved {} ({}, {} bytes) to {}",
                download.file_name,
                download.mime,
                download.clip.bytes.len(),
                path.display()
            )?,
            Err(err) => {
                error!("Unable to save {}: {err}", download.file_name);
                writeln!(out, "[error] Unable to save {}: {err}", download.file_name)?;
            }
        }
    }

    if full {
        if let Some(pages) = view.page_count {
            writeln!(out, "Document: {pages} pages")?;
        }
        writeln!(out, "Voice: {} | Speed: {}", view.voice.label(), view.speed.label())?;
        writeln!(out, "--- preview ---")?;
        writeln!(out, "{}", view.preview)?;
        writeln!(out, "---------------")?;
    }
    if let Some(advisory) = &view.advisory {
        writeln!(out, "[warning] {advisory}")?;
    }
    Ok(())
}

pub fn run<R: BufRead, W: Write>(state: &AppState, mut input: R, mut out: W) -> io::Result<()> {
    let mut session = Session::default();
    writeln!(out, "EchoVerse. Type 'help' for commands.")?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let parsed = match parse(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "[error] {message}")?;
                continue;
            }
        };

        let (event, full) = match parsed {
            Input::Quit => break,
            Input::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Input::Voices => {
                let voices = state.engine.refresh_voices();
                if voices.is_empty() {
                    writeln!(out, "No voices installed; the default voice will be used.")?;
                }
                for (index, voice) in voices.iter().enumerate() {
                    writeln!(out, "{}. {} ({})", index + 1, voice.label, voice.model_path)?;
                }
                continue;
            }
            Input::Open(path) => match fs::read(&path) {
                Ok(bytes) => (
                    Event::Upload {
                        name: file_name(&path),
                        bytes,
                    },
                    false,
                ),
                Err(err) => {
                    writeln!(out, "[error] Unable to open {path}: {err}")?;
                    continue;
                }
            },
            Input::Speed(wanted) => match Speed::lookup(&wanted) {
                Some(speed) => (Event::ChooseSpeed(speed), false),
                None => {
                    // Unrecognised speeds play at normal speed.
                    warn!("Unknown speed '{wanted}', falling back to normal");
                    writeln!(out, "[warning] Unknown speed '{wanted}'")?;
                    (Event::ChooseSpeed(Speed::Normal), false)
                }
            },
            Input::Edit => (Event::Edit(read_block(&mut input)?), false),
            Input::Show => (Event::Refresh, true),
            Input::Event(event) => (event, false),
        };

        let reply = dispatch(state, session, event);
        session = reply.session;
        print_view(&mut out, state, &reply.view, full)?;
    }

    info!("Console session finished");
    Ok(())
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
