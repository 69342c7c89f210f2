use crate::error::{Result, ScoreError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const NPM_REGISTRY_API: &str = "https://registry.npmjs.org";

static NPM_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"npmjs\.com/package/(?P<name>(?:@[a-z0-9_.-]+/)?[a-z0-9_.-]+)")
        .expect("npm package pattern is valid")
});

/// Looks up the source repository behind a registry package
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// The package's `repository.url`, or `None` when the field is absent
    async fn repository_url(&self, package_name: &str) -> Result<Option<String>>;
}

/// Extracts the package name from an npm package URL
pub fn extract_package_name(url: &str) -> Option<String> {
    NPM_PACKAGE
        .captures(url)
        .and_then(|c| c.name("name"))
        .map(|m| m.as_str().to_string())
}

/// npm registry client
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a client for the public registry
    pub fn new() -> Result<Self> {
        Self::with_base_url(NPM_REGISTRY_API)
    }

    /// Creates a client for a registry mirror or a mock server
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("trustscore/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn package_url(&self, package_name: &str) -> String {
        // Scoped names keep their `@` but the separator must be encoded
        format!("{}/{}", self.base_url, package_name.replace('/', "%2f"))
    }
}

#[async_trait]
impl RegistryClient for NpmRegistry {
    async fn repository_url(&self, package_name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.package_url(package_name))
            .send()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScoreError::NpmApi(format!(
                "Failed to fetch package info for {}: HTTP {}",
                package_name,
                response.status()
            )));
        }

        let package_info: Value = response.json().await?;
        Ok(repository_field(&package_info))
    }
}

/// `repository` is either an object with a `url` or a bare string
fn repository_field(package_info: &Value) -> Option<String> {
    match &package_info["repository"] {
        Value::String(url) => Some(url.clone()),
        Value::Object(fields) => fields.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_package_name() {
        assert_eq!(
            extract_package_name("https://www.npmjs.com/package/express"),
            Some("express".to_string())
        );
        assert_eq!(
            extract_package_name("https://www.npmjs.com/package/@babel/core"),
            Some("@babel/core".to_string())
        );
        assert_eq!(extract_package_name("https://www.npmjs.com/~sindresorhus"), None);
    }

    #[test]
    fn test_repository_field_shapes() {
        let object = json!({"repository": {"type": "git", "url": "git+https://github.com/lodash/lodash.git"}});
        let string = json!({"repository": "github:chalk/chalk"});
        let missing = json!({"name": "left-pad"});

        assert_eq!(
            repository_field(&object).as_deref(),
            Some("git+https://github.com/lodash/lodash.git")
        );
        assert_eq!(repository_field(&string).as_deref(), Some("github:chalk/chalk"));
        assert_eq!(repository_field(&missing), None);
    }

    #[tokio::test]
    async fn test_registry_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/express")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"repository": {"url": "git+https://github.com/expressjs/express.git"}}).to_string())
            .create_async()
            .await;

        let registry = NpmRegistry::with_base_url(&server.url()).unwrap();
        let url = registry.repository_url("express").await.unwrap();

        assert_eq!(url.as_deref(), Some("git+https://github.com/expressjs/express.git"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_registry_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/does-not-exist")
            .with_status(404)
            .with_body(r#"{"error":"Not found"}"#)
            .create_async()
            .await;

        let registry = NpmRegistry::with_base_url(&server.url()).unwrap();
        let result = registry.repository_url("does-not-exist").await;
        assert!(matches!(result, Err(ScoreError::NpmApi(_))));
    }
}
