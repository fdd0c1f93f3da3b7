//! Chat message model.
//!
//! Messages are immutable once built: the store only ever appends them.
//! Ids come from the millisecond clock, bumped past the previous id so two
//! messages created in the same millisecond still order correctly.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::frame::now_ms;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// Build a message with a fresh id, stamped now.
    #[must_use]
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            content: content.into(),
            sender,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Next process-wide message id: the current epoch millis, or one past the
/// last id handed out if the clock has not advanced.
fn next_message_id() -> String {
    let now = now_ms();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(seen) => last = seen,
        }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
