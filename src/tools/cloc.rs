use super::{failure_summary, run};
use crate::config::ToolCommand;
use crate::error::{Result, ScoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;

/// Code line totals for a directory tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    /// Lines of code per language
    pub by_language: BTreeMap<String, u64>,
    /// Lines of code over all languages
    pub total: u64,
}

/// Counts lines of code
#[async_trait]
pub trait LineCounter: Send + Sync {
    /// Counts the code lines under `dir`
    async fn count(&self, dir: &Path) -> Result<LineCounts>;
}

/// Line counting through `cloc --json`
pub struct Cloc {
    command: ToolCommand,
}

impl Cloc {
    /// Creates a counter running `command`
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl LineCounter for Cloc {
    async fn count(&self, dir: &Path) -> Result<LineCounts> {
        let output = run(&self.command, [OsStr::new("--json"), dir.as_os_str()]).await?;
        if !output.status.success() {
            return Err(ScoreError::tool(&self.command.program, failure_summary(&output)));
        }
        parse_report(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses a `cloc --json` report
///
/// cloc prints nothing at all for a tree without recognised source files,
/// which counts as zero lines.
pub fn parse_report(report: &str) -> Result<LineCounts> {
    if report.trim().is_empty() {
        return Ok(LineCounts::default());
    }

    let sections: Map<String, Value> = serde_json::from_str(report)?;
    let mut counts = LineCounts::default();
    for (language, section) in &sections {
        let code = section.get("code").and_then(Value::as_u64);
        match (language.as_str(), code) {
            ("header", _) => {}
            ("SUM", Some(code)) => counts.total = code,
            (_, Some(code)) => {
                counts.by_language.insert(language.clone(), code);
            }
            (_, None) => {}
        }
    }

    if !sections.contains_key("SUM") {
        counts.total = counts.by_language.values().sum();
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report() {
        let report = r#"{
            "header": {"cloc_url": "github.com/AlDanial/cloc", "n_files": 3, "n_lines": 140},
            "JavaScript": {"nFiles": 2, "blank": 10, "comment": 5, "code": 100},
            "JSON": {"nFiles": 1, "blank": 0, "comment": 0, "code": 25},
            "SUM": {"blank": 10, "comment": 5, "code": 125, "nFiles": 3}
        }"#;

        let counts = parse_report(report).unwrap();

        assert_eq!(counts.total, 125);
        assert_eq!(counts.by_language.get("JavaScript"), Some(&100));
        assert_eq!(counts.by_language.get("JSON"), Some(&25));
        assert!(!counts.by_language.contains_key("header"));
    }

    #[test]
    fn test_empty_report_is_zero() {
        assert_eq!(parse_report("").unwrap(), LineCounts::default());
        assert_eq!(parse_report("\n").unwrap().total, 0);
    }

    #[test]
    fn test_missing_sum_adds_languages() {
        let counts = parse_report(r#"{"Rust": {"code": 7}, "TOML": {"code": 3}}"#).unwrap();
        assert_eq!(counts.total, 10);
    }

    #[test]
    fn test_malformed_report() {
        assert!(parse_report("21 text files.").is_err());
    }

    #[cfg(unix)]
    fn fake_cloc(script: &str) -> Cloc {
        Cloc::new(ToolCommand::new("sh", &["-c", script, "cloc"]))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_count_runs_with_json_flag() {
        let cloc = fake_cloc(
            r#"[ "$1" = "--json" ] && [ "$2" = "/r/lodash" ] || exit 2; printf '%s' '{"JavaScript":{"code":40},"SUM":{"code":40}}'"#,
        );

        let counts = cloc.count(Path::new("/r/lodash")).await.unwrap();

        assert_eq!(counts.total, 40);
        assert_eq!(counts.by_language.get("JavaScript"), Some(&40));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_count_silent_tree_is_zero() {
        let counts = fake_cloc("exit 0").count(Path::new("/r/empty")).await.unwrap();
        assert_eq!(counts, LineCounts::default());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_count_failure_is_error() {
        let result = fake_cloc("echo 'cannot read' >&2; exit 1")
            .count(Path::new("/r/missing"))
            .await;

        assert!(matches!(result, Err(ScoreError::Tool { ref message, .. }) if message == "cannot read"));
    }
}
