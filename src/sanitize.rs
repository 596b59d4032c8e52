//! Filename sanitization for untrusted upload names.
//!
//! The sanitized name only ever ends up as a suffix of a generated temp file
//! name. It is never used to address the file on disk.

/// Upper bound on the generated suffix, separator included.
pub const MAX_SUFFIX_BYTES: usize = 128;

/// Last path segment of `raw` with control characters removed.
///
/// Both `/` and `\` count as separators since clients on any platform may
/// send either. `.` and `..` collapse to an empty name.
pub fn base_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();

    match cleaned.as_str() {
        "." | ".." => String::new(),
        _ => cleaned,
    }
}

/// Suffix appended to a generated temp file name, `_<base name>` or empty.
pub fn suffix_for(raw: Option<&str>) -> String {
    let name = raw.map(base_name).unwrap_or_default();
    if name.is_empty() {
        return String::new();
    }

    format!("_{}", tail(&name, MAX_SUFFIX_BYTES - 1))
}

// Keeps the end of the name so the extension survives truncation.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }

    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
