use crate::app::{App, AppState};
use crate::chat_message::render_transcript;
use crate::constants::{INPUT_PROMPT, SEND_BUTTON_LABEL};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame<'_>, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Transcript
            Constraint::Length(1), // Status
            Constraint::Length(3), // Input + send button
        ])
        .split(area);

    draw_transcript(f, chunks[0], app);
    app.status_indicator.render(f, chunks[1]);
    draw_input_row(f, chunks[2], app);
}

fn draw_transcript(f: &mut Frame<'_>, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Transcript")
        .style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);

    let lines = render_transcript(app.widget.messages(), inner.width);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_lines.saturating_sub(inner.height);
    app.widget.clamp_scroll(max_scroll);
    let scroll = max_scroll - app.widget.scroll_offset();

    f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn draw_input_row(f: &mut Frame<'_>, area: Rect, app: &mut App) {
    let button_width = SEND_BUTTON_LABEL.width() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(button_width)])
        .split(area);
    app.input_area = chunks[0];
    app.send_button_area = chunks[1];

    let input_block = Block::default().borders(Borders::ALL).title("Message");
    let inner = input_block.inner(chunks[0]);

    let input = app.widget.input();
    let prompt_width = INPUT_PROMPT.width() as u16;
    let visible_width = inner.width.saturating_sub(prompt_width);
    let text_width = input.width() as u16;
    let scroll_offset = text_width.saturating_sub(visible_width);

    let line = Line::from(vec![
        Span::styled(INPUT_PROMPT, Style::default().fg(Color::DarkGray)),
        Span::styled(input.to_string(), Style::default().fg(Color::White)),
    ]);
    f.render_widget(
        Paragraph::new(line)
            .block(input_block)
            .scroll((0, scroll_offset)),
        chunks[0],
    );

    let button_style = if input.trim().is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    };
    f.render_widget(
        Paragraph::new(SEND_BUTTON_LABEL)
            .style(button_style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );

    if app.state == AppState::Chat {
        let cursor_x = inner.x + prompt_width + text_width - scroll_offset;
        f.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }
}
