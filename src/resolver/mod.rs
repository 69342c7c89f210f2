//! Turns heterogeneous input strings into canonical `owner/repo` identities.

use crate::logging::Logger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// GitHub URL parsing
pub mod github;
/// npm registry lookups
pub mod npm;

pub use github::{normalize_repository_url, parse_github_url};
pub use npm::{NpmRegistry, RegistryClient};

/// Canonical identity of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// User or organization login
    pub owner: String,
    /// Repository name
    pub package_name: String,
}

impl RepositoryRef {
    /// Creates a reference from its two parts
    pub fn new(owner: &str, package_name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            package_name: package_name.to_string(),
        }
    }

    /// Clone URL under `base`, e.g. `https://github.com/owner/repo.git`
    pub fn clone_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}.git",
            base.trim_end_matches('/'),
            self.owner,
            self.package_name
        )
    }

    /// Directory name for this repository's working copy, unique per owner
    pub fn working_dir_name(&self) -> String {
        format!("{}__{}", self.owner, self.package_name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.package_name)
    }
}

/// The shapes of input URL the resolver understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// A repository on github.com
    GithubDirect,
    /// A package page on npmjs.com
    NpmRegistry,
    /// Anything else
    Invalid,
}

/// Classifies a trimmed URL by host
pub fn classify(url: &str) -> UrlKind {
    if url.contains("npmjs.com") {
        UrlKind::NpmRegistry
    } else if url.contains("github.com") {
        UrlKind::GithubDirect
    } else {
        UrlKind::Invalid
    }
}

/// Resolves input URLs, consulting the registry for package URLs
pub struct UrlResolver {
    registry: Arc<dyn RegistryClient>,
    logger: Arc<dyn Logger>,
}

impl UrlResolver {
    /// Creates a resolver backed by `registry`
    pub fn new(registry: Arc<dyn RegistryClient>, logger: Arc<dyn Logger>) -> Self {
        Self { registry, logger }
    }

    /// Resolves `url` to a repository, or `None` when it cannot be resolved
    ///
    /// Failures of any kind, including registry errors, end here.
    pub async fn resolve(&self, url: &str) -> Option<RepositoryRef> {
        let trimmed = url.trim();
        match classify(trimmed) {
            UrlKind::GithubDirect => self.resolve_github(trimmed),
            UrlKind::NpmRegistry => self.resolve_npm(trimmed).await,
            UrlKind::Invalid => {
                self.logger.info("Invalid URL");
                None
            }
        }
    }

    fn resolve_github(&self, url: &str) -> Option<RepositoryRef> {
        self.logger.info("Handling GitHub URL");
        let repo = parse_github_url(url);
        if repo.is_none() {
            self.logger.info("Invalid GitHub URL");
        }
        repo
    }

    async fn resolve_npm(&self, url: &str) -> Option<RepositoryRef> {
        self.logger.info("Handling NPM URL");
        let package_name = match npm::extract_package_name(url) {
            Some(name) => name,
            None => {
                self.logger.info("Invalid NPM URL");
                return None;
            }
        };

        let raw = match self.registry.repository_url(&package_name).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.logger
                    .info(&format!("NPM package {} has no repository field", package_name));
                return None;
            }
            Err(e) => {
                self.logger.info(&format!("Error fetching NPM package: {}", e));
                return None;
            }
        };

        let normalized = normalize_repository_url(&raw);
        self.logger.info(&format!("RepoURL: {}", normalized));
        let repo = parse_github_url(&normalized);
        match &repo {
            Some(repo) => self
                .logger
                .info(&format!("Owner: {}, Package: {}", repo.owner, repo.package_name)),
            None => self
                .logger
                .info(&format!("NPM package {} is not hosted on GitHub", package_name)),
        }
        repo
    }
}
