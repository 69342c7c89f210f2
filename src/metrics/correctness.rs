use super::{Metric, RepositoryContext};
use crate::error::Result;
use crate::logging::Logger;
use crate::resolver::RepositoryRef;
use crate::tools::eslint::totals;
use crate::tools::StaticAnalyzer;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

const LINTED_EXTENSIONS: &[&str] = &["js", "ts", "tsx"];
const ERROR_WEIGHT: u64 = 5;

/// Scores lint findings against the size of the code base
pub struct Correctness {
    analyzer: Arc<dyn StaticAnalyzer>,
    logger: Arc<dyn Logger>,
}

impl Correctness {
    /// Creates the metric
    pub fn new(analyzer: Arc<dyn StaticAnalyzer>, logger: Arc<dyn Logger>) -> Self {
        Self { analyzer, logger }
    }
}

#[async_trait]
impl Metric for Correctness {
    fn name(&self) -> &'static str {
        "Correctness"
    }

    async fn score(&self, repo: &RepositoryRef, context: &RepositoryContext) -> f64 {
        let repo_dir = match &context.repo_dir {
            Some(dir) => dir,
            None => {
                self.logger
                    .info(&format!("No working copy of {} to analyze", repo));
                return 0.0;
            }
        };

        let lines = context.total_loc().unwrap_or(0);
        if lines == 0 {
            self.logger
                .debug(&format!("No lines of code found in {}", repo_dir.display()));
            return 0.0;
        }

        match has_lintable_sources(repo_dir) {
            Ok(true) => {}
            Ok(false) => {
                self.logger.info(&format!(
                    "Failed to calculate ESLint score: no JavaScript or TypeScript sources in {}",
                    repo_dir.display()
                ));
                return 0.0;
            }
            Err(e) => {
                self.logger
                    .info(&format!("Failed to calculate ESLint score: {}", e));
                return 0.0;
            }
        }

        let findings = match self.analyzer.analyze(&[source_glob(repo_dir)]).await {
            Ok(findings) => findings,
            Err(e) => {
                self.logger
                    .info(&format!("Failed to calculate ESLint score: {}", e));
                return 0.0;
            }
        };

        let (errors, warnings) = totals(&findings);
        let score = score_from_findings(errors, warnings, lines);
        self.logger.debug(&format!(
            "ESLint errors: {}, warnings: {}, total lines: {}, final score: {} for {}",
            errors,
            warnings,
            lines,
            score,
            repo_dir.display()
        ));
        score
    }
}

/// `1 - (5·errors + warnings) / lines`, kept within `[0, 1]`; 0 for no lines
pub fn score_from_findings(errors: u64, warnings: u64, lines: u64) -> f64 {
    if lines == 0 {
        return 0.0;
    }
    let weighted = (ERROR_WEIGHT * errors + warnings) as f64;
    (1.0 - weighted / lines as f64).clamp(0.0, 1.0)
}

/// Glob covering every linted source file under `dir`
pub fn source_glob(dir: &Path) -> String {
    format!("{}/**/*.{{{}}}", dir.display(), LINTED_EXTENSIONS.join(","))
}

/// Whether `dir` holds any linted source outside `node_modules` and `.git`
///
/// Fails when the tree cannot be read.
pub fn has_lintable_sources(dir: &Path) -> Result<bool> {
    for entry in WalkDir::new(dir).into_iter().filter_entry(|entry| !is_skipped_dir(entry)) {
        let entry = entry?;
        let linted = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| LINTED_EXTENSIONS.contains(&ext));
        if linted && entry.file_type().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && matches!(entry.file_name().to_str(), Some("node_modules") | Some(".git"))
}
