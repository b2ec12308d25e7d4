//! Path pattern matching for include/exclude lists, layer prefixes and barrel names.
//!
//! Supports `**` (any number of path segments), `*` (anything within one
//! segment) and `?` (one character other than `/`). Patterns and paths are
//! compared with `/` separators.

/// Match a `/`-separated relative path against a pattern.
///
/// A pattern without wildcards matches the path itself, any path ending in
/// `/<pattern>`, and anything below the directory `<pattern>/`.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let path = path.replace('\\', "/");
    let pattern = pattern.replace('\\', "/");
    let pattern = pattern.trim_start_matches("./");

    glob_match_recursive(pattern, &path)
}

/// Match a single path segment (no separators) against a segment pattern.
pub fn segment_match(pattern: &str, segment: &str) -> bool {
    if !has_wildcard(pattern) {
        return pattern == segment;
    }
    glob_match_recursive(pattern, segment)
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

fn glob_match_recursive(pattern: &str, path: &str) -> bool {
    let Some(pos) = pattern.find(['*', '?']) else {
        let dir = pattern.trim_end_matches('/');
        return pattern == path
            || path.ends_with(&format!("/{}", pattern))
            || (!dir.is_empty() && path.starts_with(&format!("{}/", dir)));
    };
    let prefix = &pattern[..pos];
    let wildcard = &pattern[pos..];

    if let Some(suffix) = wildcard.strip_prefix("**") {
        let (suffix, whole_segments) = match suffix.strip_prefix('/') {
            Some(rest) => (rest, true),
            None => (suffix, false),
        };

        if !prefix.is_empty() && !path.starts_with(prefix) {
            // `src/**` also covers `src` itself
            return suffix.is_empty() && path == prefix.trim_end_matches('/');
        }

        let remaining = &path[prefix.len()..];

        if suffix.is_empty() {
            return true;
        }

        for (i, _) in remaining.char_indices() {
            let at_boundary = i == 0 || remaining.as_bytes()[i - 1] == b'/';
            if whole_segments && !at_boundary {
                continue;
            }
            if glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
        }
        glob_match_recursive(suffix, "")
    } else if let Some(suffix) = wildcard.strip_prefix('*') {
        let Some(remaining) = path.strip_prefix(prefix) else {
            return false;
        };

        // `*` stops at separators
        for (i, c) in remaining.char_indices() {
            if c == '/' {
                return glob_match_recursive(suffix, &remaining[i..]);
            }
            if glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
        }
        glob_match_recursive(suffix, "")
    } else {
        let Some(remaining) = path.strip_prefix(prefix) else {
            return false;
        };
        // `?` is exactly one character other than a separator
        let mut chars = remaining.chars();
        match chars.next() {
            Some(c) if c != '/' => glob_match_recursive(&wildcard[1..], chars.as_str()),
            _ => false,
        }
    }
}
