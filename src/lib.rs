#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! trustscore - composite trustworthiness scores for open-source packages
//!
//! Each input URL (a GitHub repository or an npm package page) is resolved to
//! a GitHub repository, which is then scored on five metrics:
//!
//! ## Metrics
//! - License compatibility (weight 0.30)
//! - Ramp-up time for new contributors (0.10)
//! - Maintainer responsiveness on issues (0.15)
//! - Bus factor over the last 18 months of commits (0.15)
//! - Correctness from lint findings per line of code (0.30)
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use trustscore::{logging::LogFacade, Config};
//!
//! async fn example() -> trustscore::Result<()> {
//!     let mut config = Config::load(None)?;
//!     config.apply_env();
//!     config.validate()?;
//!     let records = trustscore::run(&config, "urls.txt".as_ref(), Arc::new(LogFacade)).await?;
//!     println!("{} repositories scored", records.len());
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

/// Input file loading
pub mod batch;
/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// GitHub GraphQL access
pub mod github;
/// Logging configuration and the injected logger
pub mod logging;
/// The five metrics and the net score
pub mod metrics;
/// Parallel processing utilities
pub mod parallel;
/// URL classification and resolution
pub mod resolver;
/// External command line tools
pub mod tools;
/// Utilities (path validation, retry helpers)
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use batch::{load_batch, ResolvedEntry};
pub use config::Config;
pub use error::{Result, ScoreError};
pub use github::{GraphQlClient, RepositoryMetadata};
pub use logging::Logger;
pub use metrics::{Aggregator, MetricSet, NetScoreRecord};
pub use resolver::{RepositoryRef, UrlResolver};

use resolver::NpmRegistry;
use tools::{Cloc, Eslint, GitCli, SourceControl};

/// Scores every URL in `url_file` and prints one JSON line per repository
///
/// `config` must already be validated. Fails only when the GitHub API
/// explicitly rejects the token; everything else degrades per entry.
pub async fn run(config: &Config, url_file: &Path, logger: Arc<dyn Logger>) -> Result<Vec<NetScoreRecord>> {
    let token = config.github_token()?;
    let github = Arc::new(GraphQlClient::with_endpoint(&config.endpoints.graphql, token)?);
    match github.validate_token().await {
        Ok(true) => logger.debug("GitHub token validated"),
        Ok(false) => return Err(ScoreError::Config("Invalid GitHub token".into())),
        Err(e) => logger.info(&format!("Could not validate GitHub token: {}", e)),
    }

    let registry = Arc::new(NpmRegistry::with_base_url(&config.endpoints.npm_registry)?);
    let resolver = UrlResolver::new(registry, logger.clone());
    let entries = load_batch(url_file, &resolver, logger.as_ref()).await;

    let git = Arc::new(GitCli::new(
        config.tools.git.clone(),
        config.repos_dir.clone(),
        logger.clone(),
    ));
    let analyzer = eslint(config, logger.as_ref()).await;
    let metrics = MetricSet::standard(github, Arc::new(analyzer), logger.clone());
    let aggregator = Arc::new(
        Aggregator::new(
            metrics,
            git.clone(),
            Arc::new(Cloc::new(config.tools.cloc.clone())),
            logger.clone(),
        )
        .with_clone_base(&config.endpoints.github)
        .with_concurrency(config.concurrent_metrics),
    );

    let records = aggregator.score_batch(entries, config.jobs).await;

    if !config.keep_clones {
        if let Err(e) = git.cleanup().await {
            logger.info(&format!("Failed to remove {}: {}", config.repos_dir.display(), e));
        }
    }
    Ok(records)
}

/// Linter with the configured flat config, or the bundled one under the clone root
async fn eslint(config: &Config, logger: &dyn Logger) -> Eslint {
    let eslint = Eslint::new(config.tools.eslint.clone());
    if let Some(path) = &config.tools.eslint_config {
        return eslint.with_config(path);
    }
    match Eslint::install_bundled_config(&config.repos_dir).await {
        Ok(path) => eslint.with_config(path),
        Err(e) => {
            logger.info(&format!("Could not install the bundled ESLint config: {}", e));
            eslint
        }
    }
}
