use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Errors raised by the scoring pipeline and its collaborators
///
/// Metrics never let these escape: each one converts a failure into a
/// degraded score. They surface only from collaborators and at the
/// process boundary.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Directory traversal errors
    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// GitHub GraphQL API errors
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// NPM registry errors
    #[error("NPM API error: {0}")]
    NpmApi(String),

    /// External tool (git, cloc, eslint) failures
    #[error("{tool} failed: {message}")]
    Tool {
        /// Program name
        tool: String,
        /// Exit status or stderr excerpt
        message: String,
    },

    /// A spawned evaluation task did not complete
    #[error("Task error: {0}")]
    Task(String),
}

impl ScoreError {
    /// Builds a tool failure for `tool`
    pub fn tool(tool: &str, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Checks if this error is transient and retryable
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::IO(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.status().map_or(false, |s| s.is_server_error()),
            _ => false,
        }
    }
}
