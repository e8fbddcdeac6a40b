// src/conversation.rs

use crate::errors::ChatResult;
use crate::markup::{escape_html, render_html};
use crate::models::ChatMessage;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the transcript as pretty JSON.
pub fn save_transcript_json(messages: &[ChatMessage], path: &Path) -> ChatResult<()> {
    let json_str = serde_json::to_string_pretty(messages)?;
    fs::write(path, json_str)?;
    log::info!("transcript saved to {}", path.display());
    Ok(())
}

pub fn load_transcript_json(path: &Path) -> ChatResult<Vec<ChatMessage>> {
    let json_str = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json_str)?)
}

/// Renders the transcript as a standalone HTML page. All message text is escaped.
pub fn transcript_html(messages: &[ChatMessage]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Chat transcript</title>\n</head>\n<body>\n<div id=\"chat-box\">\n",
    );
    for message in messages {
        html.push_str(&format!(
            "<div class=\"chat-message {}-message\" title=\"{}\">{}</div>\n",
            message.sender.as_str(),
            escape_html(&message.timestamp.to_rfc3339()),
            render_html(&message.content)
        ));
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

pub fn save_transcript_html(messages: &[ChatMessage], path: &Path) -> ChatResult<()> {
    fs::write(path, transcript_html(messages))?;
    log::info!("transcript saved to {}", path.display());
    Ok(())
}

/// Writes timestamped `.json` and `.html` copies of the transcript into `dir`.
pub fn export_transcript(messages: &[ChatMessage], dir: &Path) -> ChatResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let stem = format!("transcript-{}", Local::now().format("%Y%m%d-%H%M%S"));
    let json_path = dir.join(format!("{}.json", stem));
    let html_path = dir.join(format!("{}.html", stem));

    save_transcript_json(messages, &json_path)?;
    save_transcript_html(messages, &html_path)?;
    Ok((json_path, html_path))
}
