//! Input validation helpers for upload parameters.

/// Make a client-supplied filename safe for use inside a storage key.
///
/// Takes the final path component (browsers and some clients send full
/// paths) and replaces spaces with underscores. Falls back to `"file"`
/// when nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .replace(' ', "_");

    if base.is_empty() || base == "." || base == ".." {
        "file".to_string()
    } else {
        base
    }
}

/// Parse a comma-separated tag list. Tags are trimmed of surrounding
/// whitespace and empty entries are dropped; interior whitespace is kept
/// so multi-word tags survive.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Check a content type against the configured allow-list of prefixes.
/// An empty allow-list accepts everything.
pub fn content_type_allowed(content_type: &str, allowed_prefixes: &[String]) -> bool {
    if allowed_prefixes.is_empty() {
        return true;
    }

    let normalized = content_type.to_lowercase();
    allowed_prefixes
        .iter()
        .any(|prefix| normalized.starts_with(prefix.as_str()))
}
