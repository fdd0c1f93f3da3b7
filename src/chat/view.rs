//! Render model for the chat widget.
//!
//! `ChatView` is everything the front-end needs to paint one frame: header,
//! message bubbles with their clock labels, the typing indicator, input and
//! send-button enablement, quick actions, and the message to scroll to.

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use super::input::QuickAction;
use super::message::{Message, Sender};
use super::store::ConversationStore;

pub const TITLE: &str = "Veritas Query";
pub const TAGLINE: &str = "Unlocking insights with AI";
pub const INPUT_PLACEHOLDER: &str = "Type your message here...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    /// User bubbles sit on the right, assistant bubbles on the left.
    pub align: Align,
    pub time: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        let align = match message.sender {
            Sender::User => Align::End,
            Sender::Assistant => Align::Start,
        };
        Self {
            id: message.id.clone(),
            content: message.content.clone(),
            sender: message.sender,
            align,
            time: format_time(message.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickActionView {
    pub key: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub messages: Vec<MessageView>,
    pub typing: bool,
    pub input: String,
    pub placeholder: &'static str,
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub quick_actions: Vec<QuickActionView>,
    /// Id of the newest message; the widget keeps it scrolled into view.
    pub scroll_to: Option<String>,
}

impl ChatView {
    #[must_use]
    pub fn from_store(store: &ConversationStore) -> Self {
        let responding = store.is_responding();
        let input = store.pending_input().to_string();
        Self {
            title: TITLE,
            tagline: TAGLINE,
            messages: store.messages().iter().map(MessageView::from).collect(),
            typing: responding,
            send_enabled: !responding && !input.trim().is_empty(),
            input,
            placeholder: INPUT_PLACEHOLDER,
            input_enabled: !responding,
            quick_actions: QuickAction::ALL
                .into_iter()
                .map(|action| QuickActionView { key: action.key(), label: action.label(), prompt: action.prompt() })
                .collect(),
            scroll_to: store.messages().last().map(|m| m.id.clone()),
        }
    }
}

/// Twelve-hour clock label, e.g. `"03:07 PM"`.
#[must_use]
pub fn format_time(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour repr:12]:[minute] [period]"))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
