//! URL path joining.

/// Joins a base URL and a relative path with exactly one `/` between them.
///
/// Trailing slashes on `base` and leading slashes on `path` are collapsed.
/// When either side is empty the other side is returned untouched.
///
/// # Examples
///
/// ```
/// use unified_network::join_paths;
///
/// assert_eq!(join_paths("https://host", "/p"), "https://host/p");
/// assert_eq!(join_paths("https://host/", "p"), "https://host/p");
/// assert_eq!(join_paths("", "/p"), "/p");
/// ```
pub fn join_paths(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }

    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
