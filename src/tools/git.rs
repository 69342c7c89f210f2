use super::{failure_summary, run};
use crate::config::ToolCommand;
use crate::error::{Result, ScoreError};
use crate::logging::Logger;
use crate::utils::is_valid_file_path;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Makes a working copy of a repository available on disk
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Clones `url` into a directory named `name` and returns its path
    ///
    /// Calling this again for the same name returns the existing copy.
    async fn materialize(&self, url: &str, name: &str) -> Result<PathBuf>;

    /// Removes every working copy
    async fn cleanup(&self) -> Result<()>;
}

/// Shallow clones through the `git` command line client
pub struct GitCli {
    command: ToolCommand,
    root: PathBuf,
    logger: Arc<dyn Logger>,
}

impl GitCli {
    /// Creates a client cloning under `root`
    pub fn new(command: ToolCommand, root: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Self {
        Self {
            command,
            root: root.into(),
            logger,
        }
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn materialize(&self, url: &str, name: &str) -> Result<PathBuf> {
        if name.contains('/') || name.contains('\\') || !is_valid_file_path(Path::new(name)) {
            self.logger.info("Invalid file path");
            return Err(ScoreError::Validation(format!("Invalid repository name: {}", name)));
        }

        let repo_dir = self.root.join(name);
        if is_populated(&repo_dir).await {
            self.logger
                .info(&format!("Repository already cloned to {}", repo_dir.display()));
            return Ok(repo_dir);
        }

        tokio::fs::create_dir_all(&self.root).await?;
        let output = run(
            &self.command,
            [
                OsStr::new("clone"),
                OsStr::new("--depth"),
                OsStr::new("1"),
                OsStr::new(url),
                repo_dir.as_os_str(),
            ],
        )
        .await?;

        if output.status.success() {
            self.logger
                .info(&format!("Repository cloned to {}", repo_dir.display()));
            return Ok(repo_dir);
        }

        // A concurrent evaluation of the same repository may have won the race
        let summary = failure_summary(&output);
        if summary.contains("already exists") {
            self.logger
                .info(&format!("Repository already cloned to {}", repo_dir.display()));
            return Ok(repo_dir);
        }

        self.logger.info(&format!("Error cloning repository: {}", summary));
        Err(ScoreError::tool(&self.command.program, summary))
    }

    async fn cleanup(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                self.logger
                    .debug(&format!("Removed clone directory {}", self.root.display()));
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn is_populated(dir: &Path) -> bool {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
        Err(_) => false,
    }
}
