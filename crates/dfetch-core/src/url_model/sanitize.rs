//! Resource name sanitization for use as a file stem.

/// Replaces NUL, `/`, `\` and control characters with `_` so a resource name
/// always maps to a single path component. Everything else is kept as-is.
pub fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
