// src/ui/mod.rs

pub mod chat;
pub mod footer;
pub mod quit_confirm;

use crate::app::{App, AppState};
use crate::constants::TICK_RATE_MS;
use crate::errors::ChatResult;
use crate::key_handlers::{handle_chat_input, handle_mouse, handle_quit_confirm_input};
use crate::widget::WidgetEvent;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Enum for different types of events.
enum Event {
    Input(CEvent),
    Tick,
}

enum Step {
    Ui(Event),
    Widget(WidgetEvent),
}

/// Runs the terminal UI until the user quits.
pub async fn run_ui(app: App) -> ChatResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// Main loop of the application.
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> ChatResult<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // crossterm's poll blocks, so input is read off the async workers.
    tokio::task::spawn_blocking(move || {
        let tick_rate = Duration::from_millis(TICK_RATE_MS);
        let mut last_tick = Instant::now();
        loop {
            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.blocking_send(Event::Input(ev)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::error!("failed to read terminal event: {}", e);
                        return;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    log::error!("failed to poll terminal: {}", e);
                    return;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.blocking_send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        let step = tokio::select! {
            Some(event) = rx.recv() => Step::Ui(event),
            Some(event) = app.widget.next_event() => Step::Widget(event),
            else => break,
        };

        match step {
            Step::Ui(Event::Input(CEvent::Key(key))) => match app.state {
                AppState::Chat => handle_chat_input(key, &mut app),
                AppState::QuitConfirm => handle_quit_confirm_input(key, &mut app),
                AppState::Quit => {}
            },
            Step::Ui(Event::Input(CEvent::Mouse(mouse))) => handle_mouse(mouse, &mut app),
            Step::Ui(Event::Input(_)) => {}
            Step::Ui(Event::Tick) => app.on_tick(),
            Step::Widget(event) => {
                app.widget.handle_event(event);
                app.on_tick();
            }
        }

        if app.state == AppState::Quit {
            break;
        }
    }

    app.widget.shutdown();
    Ok(())
}

pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    chat::draw_chat(f, chunks[0], app);
    if app.state == AppState::QuitConfirm {
        quit_confirm::draw_quit_confirm(f, chunks[0]);
    }
    footer::draw_footer(f, chunks[1], app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{MessageContent, Sender};
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_draw_shows_transcript_input_and_button() {
        let mut app = App::new(&Config::default()).unwrap();
        app.widget
            .append_message(Sender::User, MessageContent::Text("generate rego".into()));
        app.widget.append_message(
            Sender::Bot,
            MessageContent::Preformatted("package ericsson.consistency.cell".into()),
        );
        app.widget.set_input("draft");

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("generate rego"));
        assert!(text.contains("package ericsson.consistency.cell"));
        assert!(text.contains("draft"));
        assert!(text.contains("[ Send ]"));
        assert_eq!(app.send_button_area.width, 10);
        assert_eq!(app.send_button_area.y, app.input_area.y);
    }

    #[tokio::test]
    async fn test_quit_popup_is_drawn() {
        let mut app = App::new(&Config::default()).unwrap();
        app.request_quit();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        assert!(screen_text(&terminal).contains("Confirm Quit"));
    }
}
