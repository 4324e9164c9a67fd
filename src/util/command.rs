use std::{ffi::OsString, path::PathBuf, process::Command};

use serde::Serialize;

/// Program plus leading arguments for an external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a shell-style command line such as `python3 -m piper`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = shlex::split(raw)?.into_iter();
        let program = parts.next()?;
        Some(Self::with_args(program, parts))
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl From<PathBuf> for ExternalCommand {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}
