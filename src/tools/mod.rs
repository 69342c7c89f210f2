//! External programs the metrics consume as black boxes.

use crate::config::ToolCommand;
use crate::error::{Result, ScoreError};
use std::ffi::OsStr;
use std::process::Output;
use tokio::process::Command;

/// Line counting with `cloc`
pub mod cloc;
/// Static analysis with `eslint`
pub mod eslint;
/// Repository cloning with `git`
pub mod git;

pub use cloc::{Cloc, LineCounter, LineCounts};
pub use eslint::{Eslint, FileFindings, StaticAnalyzer};
pub use git::{GitCli, SourceControl};

/// Runs `command` followed by `args` and captures its output
///
/// A program that cannot be spawned is reported as a tool failure; the exit
/// status is left for the caller to judge.
pub(crate) async fn run<I, S>(command: &ToolCommand, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(&command.program)
        .args(&command.args)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ScoreError::tool(&command.program, format!("could not start: {}", e)))
}

/// First line of stderr, or the exit status when stderr is empty
pub(crate) fn failure_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| output.status.to_string())
}
