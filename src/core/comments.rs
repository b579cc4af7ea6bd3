//! Line comment removal.

/// Strip LaTeX line comments (`% ...`) while preserving escaped `\%`.
///
/// Works line by line: everything from the first `%` not directly preceded
/// by a backslash to the end of that line is dropped. Line breaks are kept,
/// so line numbers survive.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (idx, line) in input.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(strip_line(line));
    }
    out
}

fn strip_line(line: &str) -> &str {
    match comment_start(line) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Byte offset of the `%` opening a comment on `line`, if any.
pub fn comment_start(line: &str) -> Option<usize> {
    let mut prev_backslash = false;
    for (idx, ch) in line.char_indices() {
        if ch == '%' && !prev_backslash {
            return Some(idx);
        }
        prev_backslash = ch == '\\';
    }
    None
}

/// Whether byte `idx` of `text` sits inside a line comment.
pub fn is_commented(text: &str, idx: usize) -> bool {
    let line_start = text[..idx].rfind('\n').map_or(0, |nl| nl + 1);
    comment_start(&text[line_start..idx]).is_some()
}
