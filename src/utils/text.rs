/// Keeps at most `limit` characters, never splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Short single-line excerpt of model output for log lines.
pub fn preview(raw: &str) -> String {
    const PREVIEW_CHARS: usize = 200;
    let head = truncate_chars(raw.trim(), PREVIEW_CHARS).replace('\n', "\\n");
    if raw.trim().chars().count() > PREVIEW_CHARS {
        format!("{}...", head)
    } else {
        head
    }
}
