//! GitHub GraphQL collaborator used by the license, ramp-up, responsiveness
//! and bus factor metrics.

use crate::error::{Result, ScoreError};
use crate::resolver::RepositoryRef;
use crate::utils::with_retry;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// GraphQL documents
pub mod queries;
/// Response types
pub mod types;

use types::{
    CommitHistoryRepository, GraphQlResponse, History, LicenseInfo, LicenseRepository,
    RampUpRepository, RepositoryData, ResponsivenessRepository, ViewerData,
};

const GITHUB_GRAPHQL_API: &str = "https://api.github.com/graphql";
const API_TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;

/// Commits fetched per bus factor page
pub const COMMIT_PAGE_SIZE: u32 = 100;

/// Repository metadata consumed by the metrics
#[async_trait]
pub trait RepositoryMetadata: Send + Sync {
    /// Structured license, `None` when GitHub detected none
    async fn license_info(&self, repo: &RepositoryRef) -> Result<Option<LicenseInfo>>;

    /// Up to `first_forks` forks with their first activity, plus documentation markers
    async fn ramp_up_data(&self, repo: &RepositoryRef, first_forks: u32) -> Result<RampUpRepository>;

    /// Up to `first_issues` closed issues, plus issue totals
    async fn responsiveness_data(
        &self,
        repo: &RepositoryRef,
        first_issues: u32,
    ) -> Result<ResponsivenessRepository>;

    /// One page of default-branch history since `since`, continuing after `after`
    async fn commit_history_page(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
        after: Option<&str>,
    ) -> Result<History>;
}

/// Authenticated client for the GitHub GraphQL API
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl GraphQlClient {
    /// Creates a client for the public API
    pub fn new(token: &str) -> Result<Self> {
        Self::with_endpoint(GITHUB_GRAPHQL_API, token)
    }

    /// Creates a client for `endpoint`, e.g. an Enterprise server or a mock
    pub fn with_endpoint(endpoint: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(ScoreError::Config("GitHub token is empty".into()));
        }
        let client = Client::builder()
            .user_agent(concat!("trustscore/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }

    /// Whether the token identifies a user
    ///
    /// `Ok(false)` means the API answered and rejected the token; transport
    /// problems are errors.
    pub async fn validate_token(&self) -> Result<bool> {
        match self.request::<ViewerData>(queries::VALIDATE_TOKEN, json!({})).await {
            Ok(data) => Ok(!data.viewer.login.is_empty()),
            Err(ScoreError::GitHubApi(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Executes `query` with `variables`, retrying transient failures
    pub async fn request<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let body = json!({ "query": query, "variables": variables });
        with_retry(
            || self.send(&body),
            MAX_RETRIES,
            Duration::from_millis(RETRY_DELAY_MS),
        )
        .await
    }

    async fn send<T: DeserializeOwned>(&self, body: &Value) -> Result<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ScoreError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ScoreError::GitHubApi("Bad credentials".into()));
        }
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScoreError::GitHubApi(format!("Rate limited: HTTP {}", status)));
        }
        if status.is_server_error() {
            return Err(ScoreError::Network(format!("GitHub API unavailable: HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ScoreError::GitHubApi(format!("Unexpected HTTP {}", status)));
        }

        let envelope: GraphQlResponse<T> = response.json().await?;
        if !envelope.errors.is_empty() {
            let messages: Vec<_> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(ScoreError::GitHubApi(messages.join("; ")));
        }
        envelope
            .data
            .ok_or_else(|| ScoreError::GitHubApi("Response carried no data".into()))
    }

    async fn repository<T: DeserializeOwned>(
        &self,
        query: &str,
        repo: &RepositoryRef,
        mut variables: Value,
    ) -> Result<T> {
        variables["repoOwner"] = json!(repo.owner);
        variables["repoName"] = json!(repo.package_name);
        let data: RepositoryData<T> = self.request(query, variables).await?;
        data.repository
            .ok_or_else(|| ScoreError::GitHubApi(format!("Repository {} not found", repo)))
    }
}

#[async_trait]
impl RepositoryMetadata for GraphQlClient {
    async fn license_info(&self, repo: &RepositoryRef) -> Result<Option<LicenseInfo>> {
        let data: LicenseRepository = self
            .repository(queries::GET_VALUES_FOR_LICENSE, repo, json!({}))
            .await?;
        Ok(data.license_info)
    }

    async fn ramp_up_data(&self, repo: &RepositoryRef, first_forks: u32) -> Result<RampUpRepository> {
        self.repository(
            queries::GET_VALUES_FOR_RAMP_UP,
            repo,
            json!({ "firstForks": first_forks }),
        )
        .await
    }

    async fn responsiveness_data(
        &self,
        repo: &RepositoryRef,
        first_issues: u32,
    ) -> Result<ResponsivenessRepository> {
        self.repository(
            queries::GET_VALUES_FOR_RESPONSIVE_MAINTAINER,
            repo,
            json!({ "firstIssues": first_issues }),
        )
        .await
    }

    async fn commit_history_page(
        &self,
        repo: &RepositoryRef,
        since: DateTime<Utc>,
        after: Option<&str>,
    ) -> Result<History> {
        let data: CommitHistoryRepository = self
            .repository(
                queries::GET_VALUES_FOR_BUS_FACTOR,
                repo,
                json!({
                    "since": since.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "first": COMMIT_PAGE_SIZE,
                    "after": after,
                }),
            )
            .await?;

        // An empty repository has no default branch and therefore no commits
        Ok(data
            .default_branch_ref
            .and_then(|branch| branch.target)
            .and_then(|target| target.history)
            .unwrap_or_default())
    }
}
