// src/widget.rs

use crate::{
    api::ChatClient,
    bindings::{Bindings, Control, Trigger, WidgetAction},
    config::Config,
    errors::{ChatError, ChatResult},
    models::{ChatMessage, MessageContent, Sender, ServerResponse},
    transcript::TranscriptStore,
    utils::snippet,
};
use crossterm::event::KeyCode;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Completion of a background task, delivered back to the widget's owner.
#[derive(Debug)]
pub enum WidgetEvent {
    Reply {
        request_id: u64,
        result: ChatResult<ServerResponse>,
    },
    FollowUp {
        text: String,
    },
}

/// Chat controller: input field, transcript and the requests in between.
///
/// The owner drives it by forwarding triggers to [`ChatWidget::dispatch`] and
/// feeding every [`WidgetEvent`] from [`ChatWidget::next_event`] back through
/// [`ChatWidget::handle_event`]. Only the owner ever touches the transcript.
pub struct ChatWidget {
    client: ChatClient,
    transcript: TranscriptStore,
    input: String,
    bindings: Bindings,
    events_tx: mpsc::UnboundedSender<WidgetEvent>,
    events_rx: mpsc::UnboundedReceiver<WidgetEvent>,
    cancel: CancellationToken,
    follow_up_delay: Duration,
    next_request_id: u64,
    in_flight: usize,
    scheduled: usize,
    scroll_offset: u16,
    last_error: Option<String>,
    answered: bool,
}

impl ChatWidget {
    pub fn new(client: ChatClient, follow_up_delay: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            client,
            transcript: TranscriptStore::new(),
            input: String::new(),
            bindings: Bindings::default(),
            events_tx,
            events_rx,
            cancel: CancellationToken::new(),
            follow_up_delay,
            next_request_id: 0,
            in_flight: 0,
            scheduled: 0,
            scroll_offset: 0,
            last_error: None,
            answered: false,
        }
    }

    pub fn from_config(config: &Config) -> ChatResult<Self> {
        Ok(Self::new(ChatClient::new(config)?, config.follow_up_delay()))
    }

    /// Binds the send action to Enter on the input and to a click on the send button.
    pub fn initialize(&mut self) {
        self.bindings
            .bind(Trigger::Key(KeyCode::Enter), WidgetAction::Send);
        self.bindings
            .bind(Trigger::Click(Control::SendButton), WidgetAction::Send);
        debug!("chat widget bound {} triggers", self.bindings.len());
    }

    pub fn action_for(&self, trigger: &Trigger) -> Option<WidgetAction> {
        self.bindings.action_for(trigger)
    }

    /// Runs whatever action `trigger` is bound to. Returns whether one ran.
    pub fn dispatch(&mut self, trigger: Trigger) -> bool {
        match self.action_for(&trigger) {
            Some(WidgetAction::Send) => {
                self.send_message(None);
                true
            }
            None => false,
        }
    }

    /// Sends the trimmed input, or `override_text` when given.
    ///
    /// Empty text is ignored. Returns the request id when a request was issued.
    pub fn send_message(&mut self, override_text: Option<String>) -> Option<u64> {
        let text = match override_text {
            Some(text) => text.trim().to_string(),
            None => self.input.trim().to_string(),
        };
        if text.is_empty() {
            return None;
        }

        self.append_message(Sender::User, MessageContent::Text(text.clone()));
        self.input.clear();

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight += 1;
        debug!("request #{} -> {}", request_id, snippet(&text, 60));

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("request #{} cancelled", request_id);
                }
                result = client.send(&text) => {
                    let _ = tx.send(WidgetEvent::Reply { request_id, result });
                }
            }
        });

        Some(request_id)
    }

    /// Appends a message and scrolls so it is visible.
    pub fn append_message(&mut self, sender: Sender, content: MessageContent) {
        self.transcript.append(ChatMessage::new(sender, content));
        self.scroll_offset = 0;
    }

    /// Waits for the next background completion.
    pub async fn next_event(&mut self) -> Option<WidgetEvent> {
        self.events_rx.recv().await
    }

    pub fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Reply { request_id, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match result {
                    Ok(reply) => {
                        debug!("request #{} answered", request_id);
                        self.last_error = None;
                        self.answered = true;
                        self.apply_reply(reply);
                    }
                    Err(e) => self.record_failure(request_id, e),
                }
            }
            WidgetEvent::FollowUp { text } => {
                self.scheduled = self.scheduled.saturating_sub(1);
                info!("re-sending extracted message: {}", snippet(&text, 60));
                self.send_message(Some(text));
            }
        }
    }

    fn apply_reply(&mut self, reply: ServerResponse) {
        self.append_message(Sender::Bot, MessageContent::Text(reply.response));
        if let Some(policy) = reply.rego_policy {
            self.append_message(Sender::Bot, MessageContent::Preformatted(policy));
        } else if let Some(text) = reply.message {
            self.schedule_follow_up(text);
        }
    }

    fn schedule_follow_up(&mut self, text: String) {
        self.scheduled += 1;
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        let delay = self.follow_up_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("follow-up dropped on shutdown");
                }
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(WidgetEvent::FollowUp { text });
                }
            }
        });
    }

    // No retry and no transcript entry; the failure is only logged and shown on the status line.
    fn record_failure(&mut self, request_id: u64, err: ChatError) {
        warn!("request #{} failed: {}", request_id, err);
        self.last_error = Some(format!("Send failed ({}): {}", err.kind(), err));
    }

    /// Cancels every pending request and scheduled follow-up.
    pub fn shutdown(&mut self) {
        if !self.cancel.is_cancelled() {
            info!(
                "shutting down with {} request(s) in flight, {} follow-up(s) scheduled",
                self.in_flight, self.scheduled
            );
        }
        self.cancel.cancel();
        self.in_flight = 0;
        self.scheduled = 0;
        self.events_rx.close();
        while self.events_rx.try_recv().is_ok() {}
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.scheduled == 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.transcript.snapshot()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Whether a reply succeeded since the last call.
    pub fn take_answered(&mut self) -> bool {
        std::mem::take(&mut self.answered)
    }

    /// Lines scrolled up from the newest message; 0 follows the tail.
    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Caps the offset once the renderer knows how far the view can scroll.
    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll_offset = self.scroll_offset.min(max);
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use tokio::time::timeout;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn widget_for(server: &MockServer) -> ChatWidget {
        widget_with_delay(server, 20)
    }

    fn widget_with_delay(server: &MockServer, follow_up_delay_ms: u64) -> ChatWidget {
        let mut config = Config::default();
        config.server_url = server.uri();
        config.follow_up_delay_ms = follow_up_delay_ms;
        let mut widget = ChatWidget::from_config(&config).unwrap();
        widget.initialize();
        widget
    }

    async fn reply_to(server: &MockServer, message: &str, reply: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({ "message": message })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(server)
            .await;
    }

    async fn pump(widget: &mut ChatWidget) {
        let event = timeout(WAIT, widget.next_event())
            .await
            .expect("timed out waiting for widget event")
            .expect("event channel closed");
        widget.handle_event(event);
    }

    async fn pump_until_idle(widget: &mut ChatWidget) {
        while !widget.is_idle() {
            pump(widget).await;
        }
    }

    fn rendered(widget: &ChatWidget) -> Vec<(Sender, MessageContent)> {
        widget
            .messages()
            .iter()
            .map(|m| (m.sender, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_user_message_is_appended_before_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "hi" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let mut widget = widget_for(&server);
        widget.set_input("  hello  ");
        assert!(widget.dispatch(Trigger::Key(KeyCode::Enter)));

        assert_eq!(
            rendered(&widget),
            vec![(Sender::User, MessageContent::Text("hello".into()))]
        );
        assert_eq!(widget.input(), "");
        assert!(!widget.is_idle());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "x" })))
            .expect(0)
            .mount(&server)
            .await;

        let mut widget = widget_for(&server);
        widget.set_input("   \t ");
        assert_eq!(widget.send_message(None), None);
        assert_eq!(widget.send_message(Some(String::new())), None);
        assert!(widget.messages().is_empty());
        assert!(widget.is_idle());
    }

    #[tokio::test]
    async fn test_plain_reply_adds_one_bot_message() {
        let server = MockServer::start().await;
        reply_to(&server, "hello", json!({ "response": "hi" })).await;

        let mut widget = widget_for(&server);
        widget.set_input("hello");
        widget.send_message(None);
        pump_until_idle(&mut widget).await;

        assert_eq!(
            rendered(&widget),
            vec![
                (Sender::User, MessageContent::Text("hello".into())),
                (Sender::Bot, MessageContent::Text("hi".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_policy_reply_adds_preformatted_block() {
        let server = MockServer::start().await;
        reply_to(
            &server,
            "yes",
            json!({ "response": "ok", "rego_policy": "package p\n...", "message": "ignored" }),
        )
        .await;

        let mut widget = widget_for(&server);
        widget.send_message(Some("yes".into()));
        pump_until_idle(&mut widget).await;

        assert_eq!(
            rendered(&widget),
            vec![
                (Sender::User, MessageContent::Text("yes".into())),
                (Sender::Bot, MessageContent::Text("ok".into())),
                (Sender::Bot, MessageContent::Preformatted("package p\n...".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_extracted_message_is_resent() {
        let server = MockServer::start().await;
        reply_to(
            &server,
            "rego for user@example.com",
            json!({ "response": "extracted", "message": "user@example.com" }),
        )
        .await;
        reply_to(&server, "user@example.com", json!({ "response": "filtered" })).await;

        let mut widget = widget_for(&server);
        widget.set_input("draft");
        widget.send_message(Some("rego for user@example.com".into()));
        pump_until_idle(&mut widget).await;

        assert_eq!(
            rendered(&widget),
            vec![
                (Sender::User, MessageContent::Text("rego for user@example.com".into())),
                (Sender::Bot, MessageContent::Text("extracted".into())),
                (Sender::User, MessageContent::Text("user@example.com".into())),
                (Sender::Bot, MessageContent::Text("filtered".into())),
            ]
        );
        assert_eq!(widget.input(), "");
    }

    #[tokio::test]
    async fn test_follow_up_waits_for_delay() {
        let server = MockServer::start().await;
        reply_to(
            &server,
            "rego for Cell",
            json!({ "response": "extracted", "message": "Cell" }),
        )
        .await;
        reply_to(&server, "Cell", json!({ "response": "filtered" })).await;

        let mut widget = widget_with_delay(&server, 200);
        widget.send_message(Some("rego for Cell".into()));
        pump(&mut widget).await;
        let answered_at = Instant::now();

        assert_eq!(widget.messages().len(), 2);
        assert!(!widget.is_idle());

        let event = timeout(WAIT, widget.next_event()).await.unwrap().unwrap();
        assert!(answered_at.elapsed() >= Duration::from_millis(200));
        match &event {
            WidgetEvent::FollowUp { text } => assert_eq!(text, "Cell"),
            other => panic!("expected follow-up, got {other:?}"),
        }
        assert_eq!(widget.messages().len(), 2);

        widget.handle_event(event);
        assert_eq!(widget.messages().len(), 3);
        assert_eq!(widget.messages()[2].sender, Sender::User);
        pump_until_idle(&mut widget).await;
        assert_eq!(widget.messages().len(), 4);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_scheduled_follow_up() {
        let server = MockServer::start().await;
        reply_to(
            &server,
            "rego for Cell",
            json!({ "response": "extracted", "message": "Cell" }),
        )
        .await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "message": "Cell" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "x" })))
            .expect(0)
            .mount(&server)
            .await;

        let mut widget = widget_with_delay(&server, 300);
        widget.send_message(Some("rego for Cell".into()));
        pump(&mut widget).await;
        assert_eq!(widget.messages().len(), 2);
        assert!(!widget.is_idle());

        widget.shutdown();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(widget.next_event().await.is_none());
        assert_eq!(widget.messages().len(), 2);
        assert!(widget.is_idle());
    }

    #[tokio::test]
    async fn test_success_is_flagged_once() {
        let server = MockServer::start().await;
        reply_to(&server, "hello", json!({ "response": "hi" })).await;

        let mut widget = widget_for(&server);
        assert!(!widget.take_answered());
        widget.send_message(Some("hello".into()));
        pump_until_idle(&mut widget).await;

        assert!(widget.take_answered());
        assert!(!widget.take_answered());
    }

    #[tokio::test]
    async fn test_failures_leave_transcript_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let mut widget = widget_for(&server);
        widget.send_message(Some("hello".into()));
        pump_until_idle(&mut widget).await;

        assert_eq!(widget.messages().len(), 1);
        assert!(widget.last_error().unwrap().contains("bad reply"));
    }

    #[tokio::test]
    async fn test_replies_append_in_arrival_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "message": "slow" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "slow reply" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        reply_to(&server, "fast", json!({ "response": "fast reply" })).await;

        let mut widget = widget_for(&server);
        widget.send_message(Some("slow".into()));
        widget.send_message(Some("fast".into()));
        assert_eq!(widget.in_flight(), 2);
        pump_until_idle(&mut widget).await;

        let contents: Vec<_> = widget
            .messages()
            .iter()
            .map(|m| m.content.as_str().to_string())
            .collect();
        assert_eq!(contents, ["slow", "fast", "fast reply", "slow reply"]);
    }

    #[tokio::test]
    async fn test_shutdown_drops_pending_work() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "late" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let mut widget = widget_for(&server);
        widget.send_message(Some("hello".into()));
        widget.shutdown();

        assert!(widget.is_idle());
        assert!(widget.is_shut_down());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(widget.next_event().await.is_none());
        assert_eq!(widget.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_uninitialized_widget_ignores_triggers() {
        let server = MockServer::start().await;
        let mut config = Config::default();
        config.server_url = server.uri();
        let mut widget = ChatWidget::from_config(&config).unwrap();

        widget.set_input("hello");
        assert!(!widget.dispatch(Trigger::Click(Control::SendButton)));
        assert_eq!(widget.input(), "hello");

        widget.initialize();
        widget.initialize();
        assert!(widget.dispatch(Trigger::Click(Control::SendButton)));
        assert_eq!(widget.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_append_resets_scroll() {
        let server = MockServer::start().await;
        let mut widget = widget_for(&server);
        widget.scroll_up(7);
        assert_eq!(widget.scroll_offset(), 7);
        widget.append_message(Sender::Bot, MessageContent::Text("new".into()));
        assert_eq!(widget.scroll_offset(), 0);
    }
}
