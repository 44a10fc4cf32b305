// Delta engine boundary.
//
// The actual delta computation is done by xdelta3. `DeltaEngine` is the seam:
// it receives a prepared argument vector and answers with an integer status
// and the engine's diagnostic text. `Xdelta3Process` runs the xdelta3 binary;
// tests substitute their own implementations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

// ---------------------------------------------------------------------------
// Engine trait
// ---------------------------------------------------------------------------

/// Raw result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineReport {
    /// Zero on success.
    pub status: i32,
    /// Everything the engine printed, possibly several lines.
    pub diagnostics: String,
}

/// A binary delta encoder/decoder driven by an xdelta3-style argument vector.
///
/// Methods take `&mut self`; an engine that is not reentrant is serialised by
/// whoever owns it.
pub trait DeltaEngine {
    fn encode(&mut self, args: &[OsString]) -> EngineReport;
    fn decode(&mut self, args: &[OsString]) -> EngineReport;
}

impl<E: DeltaEngine + ?Sized> DeltaEngine for &mut E {
    fn encode(&mut self, args: &[OsString]) -> EngineReport {
        (**self).encode(args)
    }

    fn decode(&mut self, args: &[OsString]) -> EngineReport {
        (**self).decode(args)
    }
}

// ---------------------------------------------------------------------------
// xdelta3 child process
// ---------------------------------------------------------------------------

/// Status reported when xdelta3 could not be run or was killed by a signal.
pub const LAUNCH_FAILURE: i32 = -1;

/// Runs an external `xdelta3` executable.
#[derive(Debug, Clone)]
pub struct Xdelta3Process {
    program: PathBuf,
}

impl Default for Xdelta3Process {
    fn default() -> Self {
        Self::new("xdelta3")
    }
}

impl Xdelta3Process {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: &[OsString]) -> EngineReport {
        log::debug!("running {} {:?}", self.program.display(), args);

        let output = match Command::new(&self.program).args(args).output() {
            Ok(output) => output,
            Err(e) => {
                return EngineReport {
                    status: LAUNCH_FAILURE,
                    diagnostics: format!("{}: {e}", self.program.display()),
                };
            }
        };

        // xdelta3 reports on stderr; anything on stdout goes after it.
        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.stdout.is_empty() {
            diagnostics.push_str(&String::from_utf8_lossy(&output.stdout));
        }

        EngineReport {
            status: output.status.code().unwrap_or(LAUNCH_FAILURE),
            diagnostics,
        }
    }
}

impl DeltaEngine for Xdelta3Process {
    fn encode(&mut self, args: &[OsString]) -> EngineReport {
        self.run(args)
    }

    fn decode(&mut self, args: &[OsString]) -> EngineReport {
        self.run(args)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Status of an encode/decode run as presented to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Engine status, unchanged.
    pub status: i32,
    /// First line of the engine's diagnostics.
    pub message: String,
    /// The complete diagnostics.
    pub log: String,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

impl From<EngineReport> for Outcome {
    fn from(report: EngineReport) -> Self {
        Self {
            status: report.status,
            message: first_line(&report.diagnostics).to_string(),
            log: report.diagnostics,
        }
    }
}

/// Text before the first `\n`, or all of `text` if it has none.
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
