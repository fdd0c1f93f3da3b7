//! Conversation store — the authoritative message log for one chat.
//!
//! DESIGN
//! ======
//! The store is a plain synchronous state machine. It never schedules work
//! itself: `submit` only records the user message and raises the responding
//! flag, and the owning session decides when `receive` runs. Every accepted
//! mutation is published on a broadcast channel so the presentation layer can
//! re-render in order.
//!
//! INVARIANTS
//! ==========
//! - Messages are append-only and never reordered.
//! - At most one response is outstanding: `submit` is rejected while
//!   `is_responding` is set.
//! - Once disposed, nothing mutates the store again.

use tokio::sync::broadcast;
use tracing::debug;

use super::message::Message;

/// Opening assistant message shown when the widget loads.
pub const WELCOME_MESSAGE: &str = "Hello! I'm Veritas Query, your AI research assistant. I help unlock insights and find answers to complex questions. What would you like to explore today?";

const EVENT_CAPACITY: usize = 64;

/// Change notification published after each accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    MessageAppended(Message),
    RespondingChanged(bool),
    InputChanged(String),
}

/// Why a submission was ignored. None of these are user-visible errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("message is empty")]
    Empty,
    #[error("a response is already pending")]
    Busy,
    #[error("conversation is closed")]
    Disposed,
}

pub struct ConversationStore {
    messages: Vec<Message>,
    pending_input: String,
    is_responding: bool,
    disposed: bool,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    /// Empty conversation.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { messages: Vec::new(), pending_input: String::new(), is_responding: false, disposed: false, events }
    }

    /// Conversation seeded with the assistant's welcome message.
    #[must_use]
    pub fn with_welcome() -> Self {
        let mut store = Self::new();
        store.messages.push(Message::assistant(WELCOME_MESSAGE));
        store
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    #[must_use]
    pub fn is_responding(&self) -> bool {
        self.is_responding
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Subscribe to change notifications. Only events published after this
    /// call are delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Replace the uncommitted input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.disposed {
            return;
        }
        self.pending_input = text.into();
        self.publish(StoreEvent::InputChanged(self.pending_input.clone()));
    }

    /// Record a user message and mark a response as outstanding.
    ///
    /// The content is kept exactly as typed; whitespace only matters for the
    /// emptiness check.
    ///
    /// # Errors
    ///
    /// Returns the reason the submission was ignored. The store is unchanged
    /// in that case.
    pub fn submit(&mut self, text: &str) -> Result<Message, SubmitRejected> {
        if self.disposed {
            return Err(SubmitRejected::Disposed);
        }
        if text.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }
        if self.is_responding {
            return Err(SubmitRejected::Busy);
        }

        let message = Message::user(text);
        self.messages.push(message.clone());
        self.pending_input.clear();
        self.is_responding = true;
        debug!(id = %message.id, "store: user message appended");

        self.publish(StoreEvent::MessageAppended(message.clone()));
        self.publish(StoreEvent::InputChanged(String::new()));
        self.publish(StoreEvent::RespondingChanged(true));
        Ok(message)
    }

    /// Submit whatever is currently in the input field.
    ///
    /// # Errors
    ///
    /// Same as [`ConversationStore::submit`].
    pub fn submit_pending(&mut self) -> Result<Message, SubmitRejected> {
        let text = self.pending_input.clone();
        self.submit(&text)
    }

    /// Append the assistant's reply and clear the responding flag.
    ///
    /// Callers must only deliver a reply while a response is outstanding.
    /// A disposed store drops the reply and returns `None`.
    pub fn receive(&mut self, response: impl Into<String>) -> Option<Message> {
        if self.disposed {
            return None;
        }
        debug_assert!(self.is_responding, "receive called with no outstanding response");

        let message = Message::assistant(response);
        self.messages.push(message.clone());
        self.is_responding = false;
        debug!(id = %message.id, "store: assistant message appended");

        self.publish(StoreEvent::MessageAppended(message.clone()));
        self.publish(StoreEvent::RespondingChanged(false));
        Some(message)
    }

    /// Tear down: later mutations are ignored.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
