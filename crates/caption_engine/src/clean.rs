//! Caption-to-text normalization.
//!
//! Pure line filters applied in order: header token, sequence counters, cue
//! timings, inline markup, empty lines, then adjacent-duplicate collapse.

const HEADER_TOKEN: &str = "WEBVTT";
const ARROW: &str = "-->";
/// Length of `HH:MM:SS.mmm --> HH:MM:SS.mmm`.
const MIN_TIMING_LEN: usize = 29;

/// Cleans a whole caption document and joins the surviving lines with `\n`.
pub fn clean_captions(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    clean_caption_lines(&lines).join("\n")
}

/// Applies every cleaning rule to already-split lines.
pub fn clean_caption_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    dedupe_adjacent(strip_artifacts(lines))
}

/// Drops header, counter, timing and empty lines and strips markup.
pub fn strip_artifacts<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| *line != HEADER_TOKEN && !is_sequence_number(line) && !is_cue_timing(line))
        .map(strip_markup)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Compares each line only with the previously kept one.
pub fn dedupe_adjacent(lines: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if kept.last() != Some(&line) {
            kept.push(line);
        }
    }
    kept
}

pub fn is_sequence_number(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// Fixed-width check for `HH:MM:SS.mmm --> HH:MM:SS.mmm`.
pub fn is_cue_timing(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= MIN_TIMING_LEN
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes[8] == b'.'
        && line.contains(ARROW)
}

/// Removes `<...>` spans in a single non-nesting pass. An unclosed `<`
/// swallows the rest of the line.
pub fn strip_markup(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
