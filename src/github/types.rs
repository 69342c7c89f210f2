//! Response shapes of the queries in [`super::queries`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope of every GraphQL response
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    /// Payload, absent when the query failed as a whole
    pub data: Option<T>,
    /// Errors reported by the server
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// A single GraphQL error
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    /// Human readable message
    pub message: String,
}

/// `{ nodes: [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nodes<T> {
    /// The nodes
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

/// `{ edges: [{ node }] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edges<T> {
    /// The edges
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

// Manual impls: the derive would demand `T: Default`
impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> Default for Edges<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

/// `{ node }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge<T> {
    /// The node
    pub node: T,
}

/// `{ totalCount }`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Count {
    /// Number of matching items
    pub total_count: u64,
}

/// `{ repository }` wrapper shared by all repository queries
#[derive(Debug, Deserialize)]
pub struct RepositoryData<T> {
    /// `null` when the repository does not exist or is not visible
    pub repository: Option<T>,
}

/// `{ viewer { login } }`
#[derive(Debug, Deserialize)]
pub struct ViewerData {
    /// The authenticated user
    pub viewer: Viewer,
}

/// The authenticated user
#[derive(Debug, Deserialize)]
pub struct Viewer {
    /// Login, empty for a rejected token
    #[serde(default)]
    pub login: String,
}

/// License query payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRepository {
    /// Detected license, if any
    pub license_info: Option<LicenseInfo>,
}

/// GitHub's license detection result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    /// Lowercase key, e.g. `mit`
    pub key: Option<String>,
    /// Display name, e.g. `MIT License`
    pub name: Option<String>,
    /// SPDX identifier, e.g. `MIT`; `NOASSERTION` for unknown licenses
    pub spdx_id: Option<String>,
    /// choosealicense.com page
    pub url: Option<String>,
}

/// Ramp-up query payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RampUpRepository {
    /// Sampled forks
    #[serde(default)]
    pub forks: Edges<Fork>,
    /// `HEAD:README.md`, when it exists
    pub readme: Option<BlobRef>,
    /// `HEAD:CONTRIBUTING.md`, when it exists
    pub contributing: Option<BlobRef>,
}

/// A fork and the first sample of each kind of activity on it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fork {
    /// When the fork was created
    pub created_at: DateTime<Utc>,
    /// First pull request
    #[serde(default)]
    pub pull_requests: Nodes<Activity>,
    /// First issue
    #[serde(default)]
    pub issues: Nodes<Activity>,
    /// First branch
    #[serde(default)]
    pub refs: Nodes<BranchTarget>,
}

/// Anything with a creation timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// `refs.nodes[]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchTarget {
    /// Commit the branch points at
    pub target: Option<CommitTarget>,
}

/// Commit pointed at by a branch; non-commit targets have no history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitTarget {
    /// First history entry
    pub history: Option<Edges<CommitDate>>,
}

/// `{ committedDate }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDate {
    /// Commit time
    pub committed_date: DateTime<Utc>,
}

/// `object(expression:)` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlobRef {
    /// Blob id; absent when the path is not a blob
    pub id: Option<String>,
}

/// Responsive maintainer query payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsivenessRepository {
    /// Sampled closed issues
    #[serde(default)]
    pub issues: Edges<ClosedIssue>,
    /// All issues, any state
    #[serde(default)]
    pub all_issues: Count,
    /// Closed issues
    #[serde(default)]
    pub total_closed_issues: Count,
}

/// A closed issue's timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedIssue {
    /// Opening time
    pub created_at: DateTime<Utc>,
    /// Closing time
    pub closed_at: Option<DateTime<Utc>>,
}

/// Bus factor query payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHistoryRepository {
    /// `null` for an empty repository
    pub default_branch_ref: Option<DefaultBranch>,
}

/// `defaultBranchRef`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultBranch {
    /// Head commit
    pub target: Option<HistoryTarget>,
}

/// Head commit of the default branch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryTarget {
    /// History page
    pub history: Option<History>,
}

/// One page of commit history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// Commits on this page
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<HistoryCommit>>,
    /// Cursor state
    #[serde(default)]
    pub page_info: PageInfo,
}

/// A commit with its author's GitHub account, when linked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCommit {
    /// Git author
    pub author: Option<CommitAuthor>,
    /// Commit time
    pub committed_date: DateTime<Utc>,
}

impl HistoryCommit {
    /// Login of the linked GitHub account
    pub fn login(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|a| a.user.as_ref())
            .map(|u| u.login.as_str())
            .filter(|login| !login.is_empty())
    }
}

/// Git author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Linked account; `null` for unrecognized emails
    pub user: Option<User>,
}

/// GitHub account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Login
    pub login: String,
}

/// Relay cursor state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Cursor of the last item
    pub end_cursor: Option<String>,
    /// Whether another page follows
    pub has_next_page: bool,
}
