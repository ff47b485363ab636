use chrono::{DateTime, Local};
use console::measure_text_width;

/// Formats message content for the preview: leading whitespace is trimmed from
/// every line.
pub fn format_content(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split('\n')
        .map(|line| line.trim_start().to_string())
        .collect()
}

/// Renders an ISO-8601 timestamp in local time, or returns it unchanged if it does not parse
pub fn format_created_at(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => created_at.to_string(),
    }
}

/// Splits `line` into pieces no wider than `width` terminal columns
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || measure_text_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut buf = [0u8; 4];

    for ch in line.chars() {
        let ch_width = measure_text_width(ch.encode_utf8(&mut buf));
        if current_width + ch_width > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// First non-empty line of `content`, cut to `max_chars`
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
