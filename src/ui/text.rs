use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Number of terminal columns `text` occupies.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Pad `text` with spaces up to `width` columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(pad))
}

/// Wrap text to fit within a given width.
///
/// Explicit newlines are kept. Lines containing non-ASCII characters are
/// broken between characters, since CJK text has no spaces to break on;
/// other lines are broken between words, and a word wider than the line is
/// split across lines.
///
/// # Arguments
/// * `text` - The text to wrap
/// * `width` - Maximum display width per line
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for line in text.split('\n') {
        if display_width(line) <= width {
            lines.push(line.to_string());
        } else if line.is_ascii() {
            wrap_words(line, width, &mut lines);
        } else {
            wrap_chars(line, width, &mut lines);
        }
    }
    lines
}

fn wrap_words(line: &str, width: usize, lines: &mut Vec<String>) {
    let mut current_line = String::new();

    for word in line.split_whitespace() {
        if display_width(&current_line) + display_width(word) + 1 > width
            && !current_line.is_empty()
        {
            lines.push(std::mem::take(&mut current_line));
        }

        // Longer than a whole line: hard-break it and carry the tail on.
        if display_width(word) > width {
            let mut pieces = Vec::new();
            wrap_chars(word, width, &mut pieces);
            current_line = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            continue;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
}

fn wrap_chars(line: &str, width: usize, lines: &mut Vec<String>) {
    let mut current_line = String::new();
    let mut current_width = 0;

    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }
        current_line.push(ch);
        current_width += ch_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
}
