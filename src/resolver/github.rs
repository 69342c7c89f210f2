use super::RepositoryRef;
use once_cell::sync::Lazy;
use regex::Regex;

static GITHUB_REPO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/(?P<owner>[A-Za-z0-9_-]+)/(?P<repo>[A-Za-z0-9_.-]+)")
        .expect("GitHub repository pattern is valid")
});

/// Extracts the owner and repository name from a GitHub URL
///
/// Accepts `https://`, `ssh://git@` and scheme-less forms. A trailing
/// `.git` is not part of the repository name.
pub fn parse_github_url(url: &str) -> Option<RepositoryRef> {
    let captures = GITHUB_REPO.captures(url)?;
    let owner = captures.name("owner")?.as_str();
    let repo = captures.name("repo")?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() || repo == "." {
        return None;
    }
    Some(RepositoryRef::new(owner, repo))
}

/// Turns a registry `repository.url` into something [`parse_github_url`] accepts
///
/// Strips a leading `git+` and a trailing `.git`, and expands the
/// `github:owner/repo` and bare `owner/repo` shorthands.
pub fn normalize_repository_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed.strip_prefix("git+").unwrap_or(trimmed);
    let without_suffix = without_scheme.strip_suffix(".git").unwrap_or(without_scheme);

    if let Some(shorthand) = without_suffix.strip_prefix("github:") {
        return format!("https://github.com/{}", shorthand);
    }
    let is_bare_shorthand = !without_suffix.contains(':')
        && without_suffix.matches('/').count() == 1
        && !without_suffix.starts_with('/');
    if is_bare_shorthand {
        return format!("https://github.com/{}", without_suffix);
    }
    without_suffix.to_string()
}
