// src/utils.rs

/// Shortens `text` to at most `max_chars` characters, appending `...` when cut.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_keeps_short_text() {
        assert_eq!(snippet("hello", 10), "hello");
    }

    #[test]
    fn test_snippet_cuts_on_char_boundary() {
        assert_eq!(snippet("ééééé", 2), "éé...");
    }
}
