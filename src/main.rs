use std::io;

use log::{error, info};

use echoverse::{console, state::AppState, util::logging};

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Failed to initialise logger: {err}");
    }
    info!("Starting EchoVerse");

    let state = match AppState::initialise() {
        Ok(state) => state,
        Err(err) => {
            error!("Start-up failed: {err:?}");
            eprintln!("Start-up failed: {err:#}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    if let Err(err) = console::run(&state, stdin.lock(), io::stdout()) {
        error!("Console error: {err}");
    }
}
