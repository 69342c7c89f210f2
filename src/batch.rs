use crate::logging::Logger;
use crate::resolver::{RepositoryRef, UrlResolver};
use crate::utils::is_valid_file_path;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A resolved repository paired with the input line it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// Canonical repository identity
    pub repo: RepositoryRef,
    /// The input line, untrimmed
    pub url: String,
}

/// Reads a newline-delimited URL file and resolves every line
///
/// Returns an empty batch for an invalid path or a missing, unreadable or
/// empty file. Lines that do not resolve are dropped; the rest keep their
/// input order.
pub async fn load_batch(path: &Path, resolver: &UrlResolver, logger: &dyn Logger) -> Vec<ResolvedEntry> {
    if !is_valid_file_path(path) {
        logger.info("Invalid file path");
        return Vec::new();
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            logger.info(&format!("Error reading file: {}", e));
            return Vec::new();
        }
    };

    if content.trim().is_empty() {
        logger.info("Empty file");
        return Vec::new();
    }

    let mut results = Vec::new();
    for line in content.split('\n') {
        let url = line.strip_suffix('\r').unwrap_or(line);
        if url.trim().is_empty() {
            continue;
        }
        logger.info(&format!("Working with URL: {}", url));
        match resolver.resolve(url).await {
            Some(repo) => results.push(ResolvedEntry {
                repo,
                url: url.to_string(),
            }),
            None => logger.debug(&format!("Skipping unresolved URL: {}", url.trim())),
        }
    }

    logger.info(&format!("Resolved {} repositories from {}", results.len(), path.display()));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::logging::MemoryLogger;
    use crate::resolver::RegistryClient;
    use async_trait::async_trait;
    use log::Level;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StaticRegistry;

    #[async_trait]
    impl RegistryClient for StaticRegistry {
        async fn repository_url(&self, package_name: &str) -> Result<Option<String>> {
            Ok(match package_name {
                "lodash" => Some("git+https://github.com/lodash/lodash.git".to_string()),
                _ => None,
            })
        }
    }

    fn setup() -> (UrlResolver, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        (UrlResolver::new(Arc::new(StaticRegistry), logger.clone()), logger)
    }

    #[tokio::test]
    async fn test_resolves_in_input_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("urls.txt");
        std::fs::write(
            &path,
            "https://github.com/cloudinary/cloudinary_npm\r\n\
             https://example.com/not-a-repo\n\
             \n\
             https://www.npmjs.com/package/lodash\n\
             https://github.com/nullivex/nodist \n",
        )
        .unwrap();
        let (resolver, logger) = setup();

        let batch = load_batch(&path, &resolver, logger.as_ref()).await;

        let repos: Vec<_> = batch.iter().map(|e| e.repo.to_string()).collect();
        assert_eq!(repos, vec!["cloudinary/cloudinary_npm", "lodash/lodash", "nullivex/nodist"]);
        assert_eq!(batch[0].url, "https://github.com/cloudinary/cloudinary_npm");
        assert_eq!(batch[2].url, "https://github.com/nullivex/nodist ");
        assert!(logger.contains(Level::Debug, "Skipping unresolved URL: https://example.com/not-a-repo"));
    }

    #[tokio::test]
    async fn test_empty_and_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let empty = temp_dir.path().join("empty.txt");
        let blank = temp_dir.path().join("blank.txt");
        std::fs::write(&empty, "").unwrap();
        std::fs::write(&blank, "\n  \n").unwrap();
        let (resolver, logger) = setup();

        assert!(load_batch(&empty, &resolver, logger.as_ref()).await.is_empty());
        assert!(load_batch(&blank, &resolver, logger.as_ref()).await.is_empty());
        let missing = temp_dir.path().join("nonexistent_file.txt");
        assert!(load_batch(&missing, &resolver, logger.as_ref()).await.is_empty());
        assert!(logger.contains(Level::Info, "Error reading file"));
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let (resolver, logger) = setup();
        let batch = load_batch(Path::new("../urls.txt"), &resolver, logger.as_ref()).await;
        assert!(batch.is_empty());
        assert!(logger.contains(Level::Info, "Invalid file path"));
    }
}
