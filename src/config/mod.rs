use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct for the application
///
/// Layered as defaults, then an optional TOML file, then the environment.
/// Command-line flags are applied last by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub token used for every GraphQL request
    pub github_token: Option<String>,
    /// File receiving diagnostics
    pub log_file: Option<PathBuf>,
    /// Verbosity: `0` silent, `1` info, `2` debug
    pub log_level: String,
    /// Root under which repositories are cloned, one directory per repository
    pub repos_dir: PathBuf,
    /// Run the five metrics of one repository concurrently
    pub concurrent_metrics: bool,
    /// Number of repositories evaluated at the same time
    pub jobs: usize,
    /// Leave the clone directory in place after the run
    pub keep_clones: bool,
    /// Remote service locations
    pub endpoints: Endpoints,
    /// External programs
    pub tools: Tools,
}

/// Remote service locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// GitHub GraphQL endpoint
    pub graphql: String,
    /// npm registry base URL
    pub npm_registry: String,
    /// Base URL repositories are cloned from
    pub github: String,
}

/// External programs consumed as black boxes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    /// Version control client
    pub git: ToolCommand,
    /// Line counter, must understand `--json`
    pub cloc: ToolCommand,
    /// Linter, must understand `--format json`
    pub eslint: ToolCommand,
    /// Flat config for the linter; the bundled ruleset when unset
    pub eslint_config: Option<PathBuf>,
}

/// A program plus the arguments that always precede the per-call ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Executable name or path
    pub program: String,
    /// Leading arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Creates a command with leading arguments
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default config file location
    ///
    /// An explicit path must exist. The default location
    /// (`<config_dir>/trustscore/config.toml`) is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match dirs::config_dir() {
                Some(dir) => dir.join("trustscore").join("config.toml"),
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            if path.is_some() {
                return Err(ScoreError::Config(format!(
                    "Config file not found: {}",
                    config_path.display()
                )));
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parses a TOML document on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overrides settings from the process environment
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overrides settings from `lookup`; empty values are ignored
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
        if let Some(file) = get("LOG_FILE") {
            self.log_file = Some(PathBuf::from(file));
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(dir) = get("TRUSTSCORE_REPOS_DIR") {
            self.repos_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("GITHUB_GRAPHQL_URL") {
            self.endpoints.graphql = url;
        }
        if let Some(url) = get("NPM_REGISTRY_URL") {
            self.endpoints.npm_registry = url;
        }
    }

    /// Validates the settings the pipeline cannot run without
    ///
    /// A missing token or log file is reported as "Missing environment
    /// variables", matching what the binary prints before exiting.
    pub fn validate(&self) -> Result<()> {
        let token_missing = self.github_token.as_deref().map_or(true, |t| t.trim().is_empty());
        if token_missing || self.log_file.is_none() {
            return Err(ScoreError::Config("Missing environment variables".into()));
        }
        if self.jobs == 0 {
            return Err(ScoreError::Config("jobs must be at least 1".into()));
        }
        for endpoint in [
            &self.endpoints.graphql,
            &self.endpoints.npm_registry,
            &self.endpoints.github,
        ] {
            url::Url::parse(endpoint)?;
        }
        if let Some(path) = self.tools.eslint_config.as_deref().filter(|p| !p.is_file()) {
            return Err(ScoreError::Config(format!(
                "ESLint config not found: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Retrieves the GitHub token from the configuration
    pub fn github_token(&self) -> Result<&str> {
        self.github_token
            .as_deref()
            .ok_or_else(|| ScoreError::Config("GitHub token not configured".into()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            log_file: None,
            log_level: "0".to_string(),
            repos_dir: PathBuf::from("repos"),
            concurrent_metrics: true,
            jobs: 1,
            keep_clones: false,
            endpoints: Endpoints::default(),
            tools: Tools::default(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graphql: "https://api.github.com/graphql".to_string(),
            npm_registry: "https://registry.npmjs.org".to_string(),
            github: "https://github.com".to_string(),
        }
    }
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            git: ToolCommand::new("git", &[]),
            cloc: ToolCommand::new("cloc", &[]),
            eslint: ToolCommand::new("npx", &["eslint"]),
            eslint_config: None,
        }
    }
}
