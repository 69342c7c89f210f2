use super::{Metric, RepositoryContext};
use crate::github::RepositoryMetadata;
use crate::logging::Logger;
use crate::resolver::RepositoryRef;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Licenses compatible with the scoring policy, as SPDX ids and display names
pub const COMPATIBLE_LICENSES: &[&str] = &[
    "MIT",
    "Apache-2.0",
    "ISC",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "0BSD",
    "Academic Free License v3.0",
    "AFL-3.0",
    "Artistic License 2.0",
    "Artistic-2.0",
    "Boost Software License 1.0",
    "BSL-1.0",
    "BSD-4-Clause",
    "BSD-3-Clause-Clear",
    "Creative Commons license family",
    "CC",
    "Creative Commons Zero v1.0 Universal",
    "CC0-1.0",
    "Creative Commons Attribution 4.0",
    "CC-BY-4.0",
    "Creative Commons Attribution ShareAlike 4.0",
    "CC-BY-SA-4.0",
    "Do What The F*ck You Want To Public License",
    "WTFPL",
    "Educational Community License v2.0",
    "ECL-2.0",
    "Eclipse Public License 1.0",
    "EPL-1.0",
    "Eclipse Public License 2.0",
    "EPL-2.0",
    "European Union Public License 1.1",
    "EUPL-1.1",
    "GNU Affero General Public License v3.0",
    "AGPL-3.0",
    "GNU General Public License v2.0",
    "GPL-2.0",
    "GNU General Public License v3.0",
    "GPL-3.0",
    "GNU Lesser General Public License v2.1",
    "LGPL-2.1",
    "GNU Lesser General Public License v3.0",
    "LGPL-3.0",
    "LaTeX Project Public License v1.3c",
    "LPPL-1.3c",
    "Microsoft Public License",
    "MS-PL",
    "Mozilla Public License 2.0",
    "MPL-2.0",
    "Open Software License 3.0",
    "OSL-3.0",
    "PostgreSQL License",
    "PostgreSQL",
    "SIL Open Font License 1.1",
    "OFL-1.1",
    "University of Illinois/NCSA Open Source License",
    "NCSA",
    "The Unlicense",
    "Unlicense",
    "Zlib",
    "zLib License",
];

const README_NAMES: &[&str] = &["readme.md", "readme", "readme.markdown", "readme.txt"];

/// Scores 1 for a compatible license, 0 otherwise
pub struct License {
    github: Arc<dyn RepositoryMetadata>,
    logger: Arc<dyn Logger>,
}

impl License {
    /// Creates the metric
    pub fn new(github: Arc<dyn RepositoryMetadata>, logger: Arc<dyn Logger>) -> Self {
        Self { github, logger }
    }

    async fn license_from_metadata(&self, repo: &RepositoryRef) -> Option<&'static str> {
        match self.github.license_info(repo).await {
            Ok(Some(info)) => {
                self.logger.info(&format!(
                    "License reported by GitHub: {}",
                    info.spdx_id.as_deref().unwrap_or("none")
                ));
                [info.spdx_id.as_deref(), info.name.as_deref()]
                    .into_iter()
                    .flatten()
                    .find_map(compatible_license)
            }
            Ok(None) => {
                self.logger.info("No license reported by GitHub");
                None
            }
            Err(e) => {
                self.logger
                    .info(&format!("Error retrieving license information: {}", e));
                None
            }
        }
    }

    async fn license_from_readme(&self, repo_dir: &Path) -> Option<&'static str> {
        let readme = match find_readme(repo_dir).await {
            Some(path) => path,
            None => {
                self.logger
                    .info(&format!("README not found in {}", repo_dir.display()));
                return None;
            }
        };
        match tokio::fs::read_to_string(&readme).await {
            Ok(content) => license_in_text(&content),
            Err(e) => {
                self.logger
                    .info(&format!("README could not be read: {}", e));
                None
            }
        }
    }
}

#[async_trait]
impl Metric for License {
    fn name(&self) -> &'static str {
        "License"
    }

    async fn score(&self, repo: &RepositoryRef, context: &RepositoryContext) -> f64 {
        if let Some(license) = self.license_from_metadata(repo).await {
            self.logger
                .info(&format!("Compatible license from GitHub: {}", license));
            return 1.0;
        }

        if let Some(dir) = &context.repo_dir {
            if let Some(license) = self.license_from_readme(dir).await {
                self.logger
                    .info(&format!("Compatible license from README: {}", license));
                return 1.0;
            }
        }

        self.logger
            .debug(&format!("No compatible license found for {}", repo));
        0.0
    }
}

/// The allow-list entry equal to `identifier`, if any
pub fn compatible_license(identifier: &str) -> Option<&'static str> {
    COMPATIBLE_LICENSES
        .iter()
        .copied()
        .find(|license| *license == identifier)
}

/// First allow-list entry mentioned anywhere in `text`, ignoring case
pub fn license_in_text(text: &str) -> Option<&'static str> {
    let haystack = text.to_lowercase();
    COMPATIBLE_LICENSES
        .iter()
        .copied()
        .find(|license| haystack.contains(&license.to_lowercase()))
}

async fn find_readme(repo_dir: &Path) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(repo_dir).await.ok()?;
    let mut found: Vec<PathBuf> = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if README_NAMES.contains(&name.as_str()) {
            found.push(entry.path());
        }
    }
    // Prefer README.md over the other spellings
    found.sort_by_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        README_NAMES.iter().position(|candidate| *candidate == name)
    });
    found.into_iter().next()
}
