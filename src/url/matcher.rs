/// Checks whether a host belongs to an allowed root domain
///
/// The root matches itself and any of its subdomains. A leading `*.` on the
/// root is accepted and means the same thing. Comparison is case-insensitive.
///
/// # Examples
///
/// ```
/// use linkprobe::url::host_within;
///
/// assert!(host_within("example.edu", "example.edu"));
/// assert!(host_within("example.edu", "www.example.edu"));
/// assert!(host_within("*.example.edu", "study.example.edu"));
/// assert!(!host_within("example.edu", "notexample.edu"));
/// ```
pub fn host_within(root: &str, host: &str) -> bool {
    let root = root.trim().trim_start_matches("*.").to_lowercase();
    let host = host.trim().to_lowercase();

    if root.is_empty() {
        return false;
    }

    host == root || host.ends_with(&format!(".{}", root))
}
