use crate::app::{App, AppState};
use crate::bindings::{Control, Trigger};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;

const PAGE: u16 = 10;
const WHEEL: u16 = 3;

pub fn handle_chat_input(key: KeyEvent, app: &mut App) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.request_quit(),
            KeyCode::Char('e') => app.export_transcript(),
            KeyCode::Char('u') => app.widget.scroll_up(PAGE),
            KeyCode::Char('d') => app.widget.scroll_down(PAGE),
            _ => {}
        }
        return;
    }

    if app.widget.dispatch(Trigger::Key(key.code)) {
        app.status_indicator.clear_status();
        return;
    }

    match key.code {
        KeyCode::Esc => app.request_quit(),
        KeyCode::PageUp => app.widget.scroll_up(PAGE),
        KeyCode::PageDown => app.widget.scroll_down(PAGE),
        KeyCode::Up => app.widget.scroll_up(1),
        KeyCode::Down => app.widget.scroll_down(1),
        KeyCode::Backspace => app.widget.pop_char(),
        KeyCode::Char(c) => app.widget.push_char(c),
        _ => {}
    }
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.quit(),
        KeyCode::Char('n') | KeyCode::Esc => app.state = AppState::Chat,
        _ => {}
    }
}

pub fn handle_mouse(mouse: MouseEvent, app: &mut App) {
    if app.state != AppState::Chat {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let at = Position::new(mouse.column, mouse.row);
            let control = if app.send_button_area.contains(at) {
                Control::SendButton
            } else if app.input_area.contains(at) {
                Control::Input
            } else {
                return;
            };
            if app.widget.dispatch(Trigger::Click(control)) {
                app.status_indicator.clear_status();
            }
        }
        MouseEventKind::ScrollUp => app.widget.scroll_up(WHEEL),
        MouseEventKind::ScrollDown => app.widget.scroll_down(WHEEL),
        _ => {}
    }
}
