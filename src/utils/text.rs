/// Cuts `value` to at most `max_chars` characters, marking the cut with the
/// number of characters dropped.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    let total = value.chars().count();
    if total <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars).collect();
    format!("{}... [truncated {} chars]", kept, total - max_chars)
}

/// Indents every line of `value` by `width` spaces.
pub fn indent(value: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    value
        .lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}
