// src/lib.rs

pub mod api;
pub mod app;
pub mod bindings;
pub mod chat_message;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod errors;
pub mod key_handlers;
pub mod logging;
pub mod markup;
pub mod models;
pub mod repl;
pub mod status_indicator;
pub mod transcript;
pub mod ui;
pub mod utils;
pub mod widget;

pub use app::{App, AppState};
pub use errors::{ChatError, ChatResult};
pub use widget::ChatWidget;
