use super::{failure_summary, run};
use crate::config::ToolCommand;
use crate::error::{Result, ScoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name the bundled ruleset is installed under
pub const BUNDLED_CONFIG_NAME: &str = "eslint.config.mjs";

/// Flat config with core rules only, used when none is configured
pub const BUNDLED_CONFIG: &str = include_str!("../../assets/eslint.config.mjs");

/// Lint totals for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFindings {
    /// File the findings belong to
    #[serde(rename = "filePath")]
    pub path: String,
    /// Number of error-severity findings
    #[serde(rename = "errorCount")]
    pub errors: u64,
    /// Number of warning-severity findings
    #[serde(rename = "warningCount")]
    pub warnings: u64,
}

/// Runs a static analyzer over source files
#[async_trait]
pub trait StaticAnalyzer: Send + Sync {
    /// Analyzes every file matching `globs`
    async fn analyze(&self, globs: &[String]) -> Result<Vec<FileFindings>>;
}

/// Static analysis through the `eslint` command line
pub struct Eslint {
    command: ToolCommand,
    config: Option<PathBuf>,
}

impl Eslint {
    /// Creates an analyzer running `command` with ESLint's own config lookup
    pub fn new(command: ToolCommand) -> Self {
        Self {
            command,
            config: None,
        }
    }

    /// Lints with the flat config at `path` (`--config`)
    pub fn with_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// Writes the bundled ruleset into `dir` and returns its path
    pub async fn install_bundled_config(dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(BUNDLED_CONFIG_NAME);
        tokio::fs::write(&path, BUNDLED_CONFIG).await?;
        Ok(path)
    }
}

#[async_trait]
impl StaticAnalyzer for Eslint {
    async fn analyze(&self, globs: &[String]) -> Result<Vec<FileFindings>> {
        let mut args = Vec::new();
        if let Some(config) = &self.config {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
        args.extend(["--no-ignore".to_string(), "--format".into(), "json".into()]);
        args.extend(globs.iter().cloned());

        let output = run(&self.command, &args).await?;
        // Exit status 1 only means that lint errors were found
        match output.status.code() {
            Some(0) | Some(1) => parse_report(&String::from_utf8_lossy(&output.stdout)),
            _ => Err(ScoreError::tool(&self.command.program, failure_summary(&output))),
        }
    }
}

/// Parses an `eslint --format json` report
pub fn parse_report(report: &str) -> Result<Vec<FileFindings>> {
    Ok(serde_json::from_str(report.trim())?)
}

/// Sums errors and warnings over all files
pub fn totals(findings: &[FileFindings]) -> (u64, u64) {
    findings
        .iter()
        .fold((0, 0), |(errors, warnings), f| (errors + f.errors, warnings + f.warnings))
}
