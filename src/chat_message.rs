use crate::markup::sanitize_terminal;
use crate::models::{ChatMessage, MessageContent, Sender};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Turns one transcript entry into styled terminal lines wrapped to `width`.
pub fn render_message(message: &ChatMessage, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let style = base_style(message.sender);
    let indent = indent_for(message.sender);

    render_header(&mut lines, message, style, indent);
    match &message.content {
        MessageContent::Text(text) => render_text(&mut lines, text, width, style, indent),
        MessageContent::Preformatted(block) => render_block(&mut lines, block, style, indent),
    }
    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("╰─".to_string(), style),
    ]));

    lines
}

/// Renders the whole transcript with a blank line between entries.
pub fn render_transcript(messages: &[ChatMessage], width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(render_message(message, width));
    }
    lines
}

fn base_style(sender: Sender) -> Style {
    Style::default().fg(match sender {
        Sender::User => Color::Rgb(255, 223, 128),
        Sender::Bot => Color::Rgb(144, 238, 144),
    })
}

fn indent_for(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "  ",
        Sender::Bot => "",
    }
}

fn render_header(lines: &mut Vec<Line<'static>>, message: &ChatMessage, style: Style, indent: &str) {
    let label = match message.sender {
        Sender::User => "You",
        Sender::Bot => "Bot",
    };
    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("┌─".to_string(), style),
        Span::styled(label.to_string(), style.add_modifier(Modifier::BOLD)),
        Span::styled(" ", style),
        Span::styled(
            message.timestamp.format("%H:%M").to_string(),
            style.add_modifier(Modifier::DIM),
        ),
    ]));
}

fn render_text(lines: &mut Vec<Line<'static>>, text: &str, width: u16, style: Style, indent: &str) {
    let clean = sanitize_terminal(text);
    let wrap_width = (width as usize).saturating_sub(indent.len() + 2).max(1);

    for wrapped_line in wrap(&clean, wrap_width) {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled(wrapped_line.into_owned(), style),
        ]));
    }
}

// Preformatted blocks keep their line breaks and indentation; long lines are clipped by the view.
fn render_block(lines: &mut Vec<Line<'static>>, block: &str, style: Style, indent: &str) {
    let code_style = Style::default()
        .fg(Color::Rgb(209, 154, 102))
        .add_modifier(Modifier::BOLD);

    for code_line in sanitize_terminal(block).lines() {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled("▎".to_string(), Style::default().fg(Color::DarkGray)),
            Span::styled(format!(" {}", code_line), code_style),
        ]));
    }
}
