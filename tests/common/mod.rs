#![allow(dead_code)]

use async_trait::async_trait;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use trustscore::error::Result;
use trustscore::logging::MemoryLogger;
use trustscore::tools::{LineCounter, LineCounts, SourceControl};

pub mod test_helpers {
    use super::*;

    pub async fn setup_test_server() -> ServerGuard {
        mockito::Server::new_async().await
    }

    pub fn graphql_endpoint(server: &ServerGuard) -> String {
        format!("{}/graphql", server.url())
    }

    pub fn write_url_file(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, lines.join("\n") + "\n").expect("Failed to write URL file");
        path
    }

    pub fn logger() -> Arc<MemoryLogger> {
        Arc::new(MemoryLogger::new())
    }

    /// Registry document for `name` pointing at `repository`
    pub async fn mock_npm_package(server: &mut ServerGuard, name: &str, repository: &str) -> Mock {
        server
            .mock("GET", format!("/{}", name).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": name,
                    "repository": { "type": "git", "url": repository }
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    /// Answers the GraphQL operation named `operation` with `data`
    pub async fn mock_graphql(server: &mut ServerGuard, operation: &str, data: Value) -> Mock {
        server
            .mock("POST", "/graphql")
            .match_body(Matcher::Regex(format!("query {}\\(", operation)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": data }).to_string())
            .create_async()
            .await
    }

    /// Answers the viewer query
    pub async fn mock_viewer(server: &mut ServerGuard, login: &str) -> Mock {
        server
            .mock("POST", "/graphql")
            .match_body(Matcher::Regex("viewer".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "viewer": { "login": login } } }).to_string())
            .create_async()
            .await
    }

    pub fn commit_edges(logins: &[(&str, usize)]) -> Vec<Value> {
        logins
            .iter()
            .flat_map(|(login, n)| {
                (0..*n).map(move |_| {
                    json!({"node": {
                        "author": { "user": { "login": login } },
                        "committedDate": "2024-05-01T12:00:00Z"
                    }})
                })
            })
            .collect()
    }
}

/// Pretends every repository is already cloned under `root`
pub struct PrecloneSource {
    pub root: PathBuf,
}

#[async_trait]
impl SourceControl for PrecloneSource {
    async fn materialize(&self, _url: &str, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(name))
    }

    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

/// Reports a fixed number of lines for every directory
pub struct FixedLines(pub u64);

#[async_trait]
impl LineCounter for FixedLines {
    async fn count(&self, _dir: &Path) -> Result<LineCounts> {
        Ok(LineCounts {
            total: self.0,
            ..Default::default()
        })
    }
}
