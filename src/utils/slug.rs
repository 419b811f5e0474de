//! Node name checks and physical-name sanitising.
//!
//! Logical names address nodes in a document tree, physical names become
//! file and directory names on disk.

/// Characters forbidden in physical names
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '/', '"', '(', ')', '[', ']', '\t', '\r', '\n',
];

/// Whether `name` can address one tree level.
///
/// Logical names must be non-empty, must not contain `/` (the path
/// separator) and must not be `.` or `..`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

/// Remove forbidden characters and replace whitespace with underscores
pub fn sanitize_name(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
