//! Remote path helpers
//!
//! Remote paths are always `/`-separated strings, whatever the local platform.

/// Normalize a remote path: backslashes become `/` and repeated separators collapse
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for c in path.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        normalized.push(c);
    }

    normalized
}

/// Directory part of a remote path
///
/// Everything before the last component. Trailing separators are ignored, so both
/// `"/a/b/"` and `"/a/b"` yield `"/a"`, while `"/a/b/."` yields `"/a/b"`. Root-level
/// entries yield `"/"`, bare names yield `"."`.
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() {
        return if normalized.is_empty() { "." } else { "/" }.to_string();
    }

    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(index) => trimmed[..index].to_string(),
        None => ".".to_string(),
    }
}

/// Last component of a remote path, ignoring a trailing separator
pub fn file_name(path: &str) -> String {
    let normalized = normalize(path);
    normalized
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Join a remote directory and a relative path
pub fn join(base: &str, relative: &str) -> String {
    let base = normalize(base);
    let relative = normalize(relative);
    let relative = relative.trim_start_matches('/');

    if base.is_empty() {
        return relative.to_string();
    }
    if base.ends_with('/') {
        format!("{}{}", base, relative)
    } else {
        format!("{}/{}", base, relative)
    }
}
