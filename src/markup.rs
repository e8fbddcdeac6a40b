//! Rendering of message bodies for the terminal and for HTML export.
//!
//! Text is escaped by default. The only markup ever produced is the `<pre>`
//! wrapper of a trusted block, and even its body is escaped.

use crate::models::MessageContent;

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Untrusted text as an HTML paragraph.
pub fn render_text_html(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text))
}

/// A trusted block as preformatted HTML.
pub fn render_trusted_block_html(text: &str) -> String {
    format!("<pre>{}</pre>", escape_html(text))
}

pub fn render_html(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => render_text_html(text),
        MessageContent::Preformatted(text) => render_trusted_block_html(text),
    }
}

/// Makes text safe to draw in a terminal.
///
/// Control characters (escape sequences included) become U+FFFD, tabs become
/// four spaces and carriage returns are dropped. Newlines survive.
pub fn sanitize_terminal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            '\r' => {}
            c if c.is_control() => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}
