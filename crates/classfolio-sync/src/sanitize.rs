//! Path segment sanitizing.
//!
//! Student names, assignment titles and Drive file names all end up as path
//! segments, so each is cleaned the same way:
//! - characters invalid on common filesystems and control characters are removed
//! - runs of whitespace collapse to one space, runs of `_` or `-` to one character
//! - leading/trailing spaces and dots are trimmed
//! - the result is cut to 255 characters, keeping a short extension intact
//! - an empty result becomes `untitled`

/// Longest segment produced, in characters.
pub const MAX_SEGMENT_LEN: usize = 255;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Extensions longer than this are treated as part of the name when truncating.
const MAX_EXTENSION_LEN: usize = 16;

/// Clean one path segment.
pub fn sanitize_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev: Option<char> = None;

    for c in name.chars() {
        let c = if c.is_whitespace() { ' ' } else { c };
        if INVALID_CHARS.contains(&c) || c.is_control() {
            continue;
        }
        if matches!(c, ' ' | '_' | '-') && prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }

    let trimmed = out.trim_matches(|c: char| c == ' ' || c == '.');
    let mut result = truncate_keeping_extension(trimmed, MAX_SEGMENT_LEN);

    if result.is_empty() {
        return "untitled".to_string();
    }

    let stem = result.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        result.insert(0, '_');
        result = truncate_keeping_extension(&result, MAX_SEGMENT_LEN);
    }
    result
}

/// Replace (or add) the extension of an already sanitized file name.
pub fn with_extension(file_name: &str, extension: &str) -> String {
    let stem = match split_extension(file_name) {
        Some((stem, ext)) if !stem.is_empty() && is_known_replaceable(ext) => stem,
        _ => file_name,
    };
    sanitize_segment(&format!("{stem}.{extension}"))
}

/// Split `name` into stem and extension at the last dot.
pub fn split_extension(name: &str) -> Option<(&str, &str)> {
    let idx = name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some((&name[..idx], &name[idx + 1..]))
}

fn is_known_replaceable(ext: &str) -> bool {
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "docx" | "xlsx" | "pptx" | "doc" | "xls" | "ppt" | "png" | "gdoc" | "gsheet" | "gslides"
    )
}

fn truncate_keeping_extension(name: &str, max: usize) -> String {
    let count = name.chars().count();
    if count <= max {
        return name.to_string();
    }

    if let Some((stem, ext)) = split_extension(name) {
        let ext_len = ext.chars().count();
        if ext_len > 0 && ext_len <= MAX_EXTENSION_LEN {
            let keep = max - ext_len - 1;
            let stem: String = stem.chars().take(keep).collect();
            let stem = stem.trim_end_matches([' ', '.']);
            return format!("{stem}.{ext}");
        }
    }

    name.chars().take(max).collect::<String>().trim_end_matches([' ', '.']).to_string()
}
