//! Filename sanitization utilities

/// Longest file stem we produce, in characters
const MAX_NAME_CHARS: usize = 100;

/// Sanitize a filename for safe filesystem usage
///
/// Replaces filesystem-unsafe characters with visually similar Unicode alternatives
/// that are safe to use in filenames across all major operating systems.
/// Control characters become `_`, trailing dots are dropped (Windows refuses them),
/// and the result is capped at 100 characters. An empty result is replaced by `_`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' => '⧸',  // U+29F8 - Big Solidus
            '\\' => '⧹', // U+29F9 - Big Reverse Solidus
            ':' => '꞉',  // U+A789 - Modifier Letter Colon
            '*' => '⁎',  // U+204E - Low Asterisk
            '?' => '？', // U+FF1F - Fullwidth Question Mark
            '"' => '″',  // U+2033 - Double Prime
            '<' => '‹',  // U+2039 - Single Left Angle Quote
            '>' => '›',  // U+203A - Single Right Angle Quote
            '|' => '｜', // U+FF5C - Fullwidth Vertical Line
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();

    let truncated: String = replaced.trim().chars().take(MAX_NAME_CHARS).collect();
    let cleaned = truncated.trim_end_matches(['.', ' ']).trim_start();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Build the output file name for a playlist track: `"07 - Title.mp3"`
pub fn track_file_name(ordinal: usize, title: &str, extension: &str) -> String {
    format!("{:02} - {}.{}", ordinal, sanitize_filename(title), extension)
}
