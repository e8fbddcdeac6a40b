//! Line-mode front end: a `You:` prompt on stdin, replies printed to stdout.

use crate::bindings::Trigger;
use crate::constants::EXIT_COMMAND;
use crate::errors::ChatResult;
use crate::markup::sanitize_terminal;
use crate::models::{ChatMessage, MessageContent, Sender};
use crate::widget::ChatWidget;
use colored::Colorize;
use crossterm::event::KeyCode;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::mpsc as std_mpsc;
use tokio::sync::mpsc;

enum Input {
    Line(String),
    Exit,
}

/// Formats one transcript entry for line output.
pub fn format_message(message: &ChatMessage) -> String {
    let label = match message.sender {
        Sender::User => "You:".green().bold(),
        Sender::Bot => "Bot:".blue().bold(),
    };
    match &message.content {
        MessageContent::Text(text) => format!("{} {}", label, sanitize_terminal(text)),
        MessageContent::Preformatted(block) => {
            let body: Vec<String> = sanitize_terminal(block)
                .lines()
                .map(|line| format!("    {}", line).yellow().to_string())
                .collect();
            format!("{}\n{}", label, body.join("\n"))
        }
    }
}

pub async fn run_repl(mut widget: ChatWidget) -> ChatResult<()> {
    let (line_tx, mut line_rx) = mpsc::channel::<Input>(1);
    let (ready_tx, ready_rx) = std_mpsc::channel::<()>();

    // rustyline blocks; the editor lives on its own thread and waits for a go-ahead before each prompt.
    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                log::error!("failed to start line editor: {}", e);
                let _ = line_tx.blocking_send(Input::Exit);
                return;
            }
        };
        while ready_rx.recv().is_ok() {
            let input = match editor.readline("You: ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if line.trim().eq_ignore_ascii_case(EXIT_COMMAND) {
                        Input::Exit
                    } else {
                        Input::Line(line)
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Input::Exit,
                Err(e) => {
                    log::error!("readline failed: {}", e);
                    Input::Exit
                }
            };
            if line_tx.blocking_send(input).is_err() {
                return;
            }
        }
    });

    println!("Rego chat ready. Type '{}' to quit.\n", EXIT_COMMAND);
    loop {
        if ready_tx.send(()).is_err() {
            break;
        }
        let line = match line_rx.recv().await {
            Some(Input::Line(line)) => line,
            Some(Input::Exit) | None => break,
        };

        widget.set_input(line);
        widget.dispatch(Trigger::Key(KeyCode::Enter));
        // The prompt already echoed what the user typed.
        let mut printed = widget.transcript().len();

        while !widget.is_idle() {
            let Some(event) = widget.next_event().await else {
                break;
            };
            widget.handle_event(event);
            for message in widget.transcript().since(printed) {
                println!("{}", format_message(message));
            }
            printed = widget.transcript().len();
            if let Some(error) = widget.take_last_error() {
                eprintln!("{}", error.red());
            }
        }
    }

    widget.shutdown();
    println!("Exiting chatbot. Goodbye!");
    Ok(())
}
