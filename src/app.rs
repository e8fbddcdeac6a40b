use crate::config::Config;
use crate::conversation::export_transcript;
use crate::errors::ChatResult;
use crate::status_indicator::StatusIndicator;
use crate::widget::ChatWidget;
use ratatui::layout::Rect;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Chat,
    QuitConfirm,
    Quit,
}

pub struct App {
    pub state: AppState,
    pub widget: ChatWidget,
    pub status_indicator: StatusIndicator,
    /// Where the send button and input box were last drawn, for mouse hit-testing.
    pub send_button_area: Rect,
    pub input_area: Rect,
    pub export_dir: PathBuf,
}

impl App {
    pub fn new(config: &Config) -> ChatResult<App> {
        let mut widget = ChatWidget::from_config(config)?;
        widget.initialize();

        let mut status_indicator = StatusIndicator::new();
        status_indicator.set_status(format!("Connected to {}", config.chat_endpoint()));

        Ok(App {
            state: AppState::Chat,
            widget,
            status_indicator,
            send_button_area: Rect::default(),
            input_area: Rect::default(),
            export_dir: PathBuf::from(&config.export_dir),
        })
    }

    /// Refreshes the status line from the widget.
    pub fn on_tick(&mut self) {
        self.status_indicator.set_thinking(!self.widget.is_idle());
        self.status_indicator.update_spinner();
        if self.widget.take_answered() && self.status_indicator.is_error() {
            self.status_indicator.clear_status();
        }
        if let Some(error) = self.widget.take_last_error() {
            self.status_indicator.set_error(error);
        }
    }

    pub fn export_transcript(&mut self) {
        if self.widget.messages().is_empty() {
            self.status_indicator.set_status("Nothing to export yet");
            return;
        }
        match export_transcript(self.widget.messages(), &self.export_dir) {
            Ok((json_path, html_path)) => self.status_indicator.set_status(format!(
                "Saved {} and {}",
                json_path.display(),
                html_path.display()
            )),
            Err(e) => {
                log::error!("export failed: {}", e);
                self.status_indicator.set_error(format!("Export failed: {}", e));
            }
        }
    }

    pub fn request_quit(&mut self) {
        self.state = AppState::QuitConfirm;
    }

    pub fn quit(&mut self) {
        self.widget.shutdown();
        self.state = AppState::Quit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_successful_reply_clears_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({ "message": "broken" })))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({ "message": "mo type" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.server_url = server.uri();
        let mut app = App::new(&config).unwrap();

        app.widget.send_message(Some("broken".into()));
        let event = app.widget.next_event().await.unwrap();
        app.widget.handle_event(event);
        app.on_tick();
        assert!(app.status_indicator.is_error());
        assert!(app.status_indicator.status_text().contains("server error"));

        app.widget.send_message(Some("mo type".into()));
        let event = app.widget.next_event().await.unwrap();
        app.widget.handle_event(event);
        app.on_tick();
        assert!(!app.status_indicator.is_error());
        assert_eq!(app.status_indicator.status_text(), "");
    }

    #[tokio::test]
    async fn test_success_keeps_informational_status() {
        let mut app = App::new(&Config::default()).unwrap();
        app.on_tick();
        assert!(app.status_indicator.status_text().starts_with("Connected to "));
    }
}
