use std::path::{Path, PathBuf};

const MAX_STEM_LEN: usize = 100;
const OUTPUT_EXTENSION: &str = "txt";

/// Path of the cleaned transcript for `title` inside `output_dir`.
///
/// Depends on the title alone so a later run over the same video lands on
/// the same file and can skip it.
pub fn output_path_for_title(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(output_filename(title))
}

/// Windows-safe, deterministic filename: `{sanitized_title}.txt`
pub fn output_filename(title: &str) -> String {
    format!("{}.{OUTPUT_EXTENSION}", sanitize_title(title))
}

pub fn sanitize_title(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    // Collapse runs of underscores and whitespace.
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev: Option<char> = None;
    for c in cleaned.chars() {
        let c = if c.is_whitespace() { ' ' } else { c };
        if (c == '_' || c == ' ') && prev == Some(c) {
            continue;
        }
        compacted.push(c);
        prev = Some(c);
    }

    let mut final_name = truncate_on_char_boundary(&compacted, MAX_STEM_LEN)
        .trim_end_matches(&['_', ' ', '.'][..])
        .to_string();
    if final_name.is_empty() {
        final_name = "untitled".to_string();
    }
    if is_reserved_windows_name(&final_name) {
        final_name.push('_');
    }
    final_name
}

fn truncate_on_char_boundary(input: &str, max_len: usize) -> &str {
    if input.len() <= max_len {
        return input;
    }
    let mut end = max_len;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
