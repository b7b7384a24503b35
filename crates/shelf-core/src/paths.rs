//! Virtual path utilities.
//!
//! Virtual paths are rooted, `/`-separated strings (`/videos/a.mp4`). They are
//! independent of the host OS path syntax; backends map them onto real
//! filesystem paths themselves.

/// Normalize a virtual path: collapse `.`/`..` and duplicate separators.
///
/// Returns `None` when the path climbs above the root, which callers must
/// treat as a traversal attempt.
pub fn normalize(raw: &str) -> Option<String> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return None;
                }
            }
            s => stack.push(s),
        }
    }
    if stack.is_empty() {
        Some("/".to_string())
    } else {
        Some(format!("/{}", stack.join("/")))
    }
}

/// Split a virtual path into (parent directory, base name).
pub fn split(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => ("/".to_string(), trimmed[1..].to_string()),
        Some(idx) => (trimmed[..idx].to_string(), trimmed[idx + 1..].to_string()),
        None => ("/".to_string(), trimmed.to_string()),
    }
}

/// Join a directory and a child name.
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Base name with the extension stripped (`clip.mp4` -> `clip`).
pub fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// File extension in lowercase, without the dot.
pub fn extension(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(name[idx + 1..].to_lowercase()),
    }
}
