//! Where the child's command line comes from.
//!
//! Arguments given on Backdrop's own command line win. Without them the
//! companion file `<binary-stem>.txt` next to the binary supplies a
//! tab-separated list, so a renamed copy of Backdrop can wrap a fixed
//! application without a shortcut.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::WindowResult;

/// Launched when no command is configured anywhere.
pub const DEFAULT_PROGRAM: &str = "calc";

/// The executable and argument string to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub program: String,
    /// Passed to the child verbatim.
    pub args: String,
}

impl LaunchTarget {
    pub fn new(program: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: args.into(),
        }
    }

    /// Builds a target from `[executable, arg, arg, ...]`.
    ///
    /// Remaining elements are joined with single spaces. An empty list,
    /// or one whose first element is empty, means [`DEFAULT_PROGRAM`]
    /// with no arguments.
    pub fn from_list(list: &[String]) -> Self {
        match list.split_first() {
            Some((program, rest)) if !program.is_empty() => Self::new(program, rest.join(" ")),
            _ => Self::new(DEFAULT_PROGRAM, ""),
        }
    }
}

impl fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args)
        }
    }
}

/// Files that live next to the binary and share its stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companions {
    /// The binary's file stem, also used as the host window title.
    pub stem: String,
    /// Tab-separated argument list.
    pub args_file: PathBuf,
    /// Host icon and initial background.
    pub icon_file: PathBuf,
}

impl Companions {
    pub fn for_binary(exe: &Path) -> Self {
        let stem = exe
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backdrop".into());
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Self {
            args_file: dir.join(format!("{stem}.txt")),
            icon_file: dir.join(format!("{stem}.ico")),
            stem,
        }
    }

    /// Companions of the running executable.
    pub fn current() -> WindowResult<Self> {
        Ok(Self::for_binary(&std::env::current_exe()?))
    }

    /// The icon path, if the file exists.
    pub fn icon(&self) -> Option<&Path> {
        self.icon_file.is_file().then_some(self.icon_file.as_path())
    }
}

/// Resolves the launch target from the command line or the companion
/// file.
pub fn resolve(cli: Vec<String>, companions: &Companions) -> LaunchTarget {
    let list = if cli.is_empty() {
        read_args_file(&companions.args_file)
    } else {
        cli
    };
    LaunchTarget::from_list(&list)
}

/// Reads a tab-separated argument list.
///
/// A missing file is created empty so users can find where to put their
/// command. Any I/O failure yields an empty list.
pub fn read_args_file(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => split_args(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Err(e) = File::create(path) {
                crate::log_warn!("could not create {}: {e}", path.display());
            }
            Vec::new()
        }
        Err(e) => {
            crate::log_warn!("could not read {}: {e}", path.display());
            Vec::new()
        }
    }
}

fn split_args(content: &str) -> Vec<String> {
    content
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .map(str::to_owned)
        .collect()
}
