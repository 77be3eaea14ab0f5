//! `/`-joined tree paths relative to the workspace root.
//!
//! The workspace root itself is the empty path `""`; its children are plain
//! names (`"src"`), deeper nodes join ancestor names with `/` (`"src/app.ts"`).

use compact_str::CompactString;

pub const SEPARATOR: char = '/';

pub fn join(parent: &str, name: &str) -> CompactString {
    if parent.is_empty() {
        return CompactString::from(name);
    }
    let mut out = CompactString::with_capacity(parent.len() + 1 + name.len());
    out.push_str(parent);
    out.push(SEPARATOR);
    out.push_str(name);
    out
}

/// Parent path, `""` for top-level entries and `None` for the root.
pub fn parent_of(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(idx) => Some(&path[..idx]),
        None => Some(""),
    }
}

pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Number of ancestors between `path` and the root (top-level entries are 0).
pub fn depth_of(path: &str) -> u16 {
    if path.is_empty() {
        return 0;
    }
    path.matches(SEPARATOR).count() as u16
}

/// `true` if `path` equals `ancestor` or lives below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Rewrites `path` from under `from` to under `to`. Returns `None` when `path`
/// is not within `from`.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<CompactString> {
    if !is_within(path, from) {
        return None;
    }
    if from.is_empty() {
        return Some(join(to, path));
    }
    let rest = &path[from.len()..];
    let rest = rest.strip_prefix(SEPARATOR).unwrap_or(rest);
    if rest.is_empty() {
        return Some(CompactString::from(to));
    }
    Some(join(to, rest))
}

/// Ancestor paths of `path`, outermost first, excluding the root and `path`.
pub fn ancestors(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for (idx, ch) in path.char_indices() {
        if ch == SEPARATOR {
            out.push(&path[..idx]);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/models/path.rs"]
mod tests;
