//! Path normalization and resolution.
//!
//! All store operations work on normalized absolute paths. Resolution is
//! deliberately lenient: `..` segments that would climb above root clamp at
//! root instead of erroring, so a stray relative link in a learner's project
//! can never crash the host. That behavior is pinned by a test below.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid name regex"));

/// Normalize a path into canonical absolute form.
///
/// Collapses repeated slashes, resolves `.` and `..` segments (clamping at
/// root), strips any trailing slash, and guarantees a leading `/`.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Climbing above root clamps at root.
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Resolve `target` against a base directory.
///
/// Supports absolute targets, `~`-prefixed targets (treated as root-relative),
/// and relative targets with `.` and `..` segments. The result is always
/// normalized and never carries a trailing slash except root.
pub fn resolve(base: &str, target: &str) -> String {
    if let Some(rest) = target.strip_prefix('~') {
        return normalize(rest);
    }
    if target.starts_with('/') {
        return normalize(target);
    }
    normalize(&format!("{base}/{target}"))
}

/// The parent path of a normalized path, or `None` for root.
pub fn parent(path: &str) -> Option<String> {
    let normalized = normalize(path);
    if normalized == "/" {
        return None;
    }
    match normalized.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(normalized[..idx].to_string()),
        None => None,
    }
}

/// The final segment of a normalized path (empty for root).
pub fn basename(path: &str) -> String {
    let normalized = normalize(path);
    normalized.rsplit('/').next().unwrap_or_default().to_string()
}

/// Whether `name` is acceptable as a single file or folder name.
///
/// Restricted to a conservative identifier charset: alphanumeric start, then
/// alphanumerics, dots, underscores, and hyphens. Rules out path separators,
/// whitespace, and the `.`/`..` pseudo-entries by construction.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("/a/b"), "/a/b");
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/a//b/"), "/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_normalize_dot_segments() {
        assert_eq!(normalize("/a/./b"), "/a/b");
        assert_eq!(normalize("/a/b/.."), "/a");
        assert_eq!(normalize("/a/b/../.."), "/");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve("/a/b", ".."), "/a");
        assert_eq!(resolve("/a/b", "c"), "/a/b/c");
        assert_eq!(resolve("/a/b", "./c"), "/a/b/c");
        assert_eq!(resolve("/a/b", "../../c"), "/c");
    }

    #[test]
    fn test_resolve_absolute_and_home() {
        assert_eq!(resolve("/a/b", "/x/y"), "/x/y");
        assert_eq!(resolve("/a/b", "~"), "/");
        assert_eq!(resolve("/a/b", "~/css/site.css"), "/css/site.css");
    }

    /// Pins the lenient clamping behavior: unbalanced `..` above root
    /// resolves to a defined path at root instead of erroring.
    #[test]
    fn test_resolve_clamps_above_root() {
        assert_eq!(resolve("/a/b", "../../../c"), "/c");
        assert_eq!(resolve("/", "../../.."), "/");
        assert_eq!(normalize("/../../x"), "/x");
    }

    #[test]
    fn test_parent_and_basename() {
        assert_eq!(parent("/a/b"), Some("/a".to_string()));
        assert_eq!(parent("/a"), Some("/".to_string()));
        assert_eq!(parent("/"), None);
        assert_eq!(basename("/a/b.css"), "b.css");
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("index.html"));
        assert!(is_valid_name("my-styles_2.css"));
        assert!(!is_valid_name(".hidden"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name(".."));
    }
}
