use std::path::{Component, Path, PathBuf};

/// Normalize a user-provided local path string into a PathBuf
///
/// - Trims leading/trailing whitespace
/// - Strips surrounding single or double quotes if present
/// - Expands a leading '~' to the HOME directory when possible
pub fn normalize_user_input_path(input: &str) -> PathBuf {
    let trimmed = input.trim();

    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    if unquoted.starts_with('~') {
        let without_tilde = unquoted
            .strip_prefix("~/")
            .or_else(|| unquoted.strip_prefix('~'))
            .unwrap_or(unquoted);
        if let Some(home) = std::env::var_os("HOME") {
            let mut buf = PathBuf::from(home);
            if !without_tilde.is_empty() {
                buf.push(without_tilde);
            }
            return buf;
        }
    }

    PathBuf::from(unquoted)
}

/// Basic validation to keep file access inside the intended tree
///
/// Rejects empty paths, paths with NUL bytes and any parent-directory
/// segment, wherever it appears.
pub fn is_valid_file_path(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    if raw.trim().is_empty() || raw.contains('\0') || raw.contains("..") {
        return false;
    }
    !path.components().any(|c| matches!(c, Component::ParentDir))
}
