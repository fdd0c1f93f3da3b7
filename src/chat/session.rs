//! Chat session — one conversation store driven by the response simulator.
//!
//! DESIGN
//! ======
//! `submit` runs synchronously against the store, then spawns a single tokio
//! task that sleeps for the simulated thinking time, generates the reply and
//! delivers it with `receive`. The store's responding flag guarantees at most
//! one such task is live per session.
//!
//! LIFECYCLE
//! =========
//! 1. Widget connects → session created (usually with the welcome message)
//! 2. Submit → user message appended → reply task spawned
//! 3. Delay elapses → reply generated → assistant message appended
//! 4. Widget goes away → `dispose` aborts the task and closes the store
//!
//! The reply task holds only a `Weak` handle to the store and re-checks the
//! disposed flag before mutating, so a timer that fires during teardown
//! cannot touch a closed conversation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::input::{KeyPress, QuickAction};
use super::message::Message;
use super::simulator::ResponseSimulator;
use super::store::{ConversationStore, StoreEvent, SubmitRejected};
use super::view::ChatView;

pub struct ChatSession {
    id: Uuid,
    store: Arc<Mutex<ConversationStore>>,
    simulator: Arc<Mutex<ResponseSimulator>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatSession {
    #[must_use]
    pub fn new(store: ConversationStore, simulator: ResponseSimulator) -> Self {
        Self {
            id: Uuid::new_v4(),
            store: Arc::new(Mutex::new(store)),
            simulator: Arc::new(Mutex::new(simulator)),
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        lock(&self.store).subscribe()
    }

    /// Snapshot of the widget as it should currently render.
    #[must_use]
    pub fn view(&self) -> ChatView {
        ChatView::from_store(&lock(&self.store))
    }

    #[must_use]
    pub fn is_responding(&self) -> bool {
        lock(&self.store).is_responding()
    }

    /// Run `f` against the store under its lock.
    #[cfg(test)]
    pub fn with_store<T>(&self, f: impl FnOnce(&ConversationStore) -> T) -> T {
        f(&lock(&self.store))
    }

    pub fn set_input(&self, text: impl Into<String>) {
        lock(&self.store).set_input(text);
    }

    /// Fill the input with a preset prompt without sending it.
    pub fn apply_quick_action(&self, action: QuickAction) {
        self.set_input(action.prompt());
    }

    /// Submit `text` and schedule the simulated reply.
    ///
    /// # Errors
    ///
    /// Returns why the submission was ignored (empty, busy or closed).
    pub fn submit(&self, text: &str) -> Result<Message, SubmitRejected> {
        let message = lock(&self.store).submit(text)?;
        self.schedule_reply(message.content.clone());
        Ok(message)
    }

    /// Submit the current input field contents (the send button).
    ///
    /// # Errors
    ///
    /// Same as [`ChatSession::submit`].
    pub fn submit_pending(&self) -> Result<Message, SubmitRejected> {
        let message = lock(&self.store).submit_pending()?;
        self.schedule_reply(message.content.clone());
        Ok(message)
    }

    /// Handle a key press in the input field. Returns `Ok(None)` for keys
    /// that do not submit.
    ///
    /// # Errors
    ///
    /// Same as [`ChatSession::submit`] when the key submits.
    pub fn handle_key(&self, key: &KeyPress) -> Result<Option<Message>, SubmitRejected> {
        if !key.is_submit() {
            return Ok(None);
        }
        self.submit_pending().map(Some)
    }

    /// Tear down: cancel any pending reply and close the store.
    pub fn dispose(&self) {
        if let Some(handle) = lock(&self.pending).take() {
            handle.abort();
        }
        let mut store = lock(&self.store);
        if !store.is_disposed() {
            store.dispose();
            info!(session_id = %self.id, "chat: session disposed");
        }
    }

    fn schedule_reply(&self, user_text: String) {
        let delay = lock(&self.simulator).schedule_delay();
        let store = Arc::downgrade(&self.store);
        let simulator = Arc::clone(&self.simulator);
        let session_id = self.id;

        debug!(%session_id, ?delay, "chat: reply scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(store_ref) = store.upgrade() else {
                debug!(%session_id, "chat: session gone, reply dropped");
                return;
            };
            let mut store = lock(&store_ref);
            if store.is_disposed() {
                debug!(%session_id, "chat: session disposed, reply dropped");
                return;
            }
            let reply = lock(&simulator).generate(&user_text);
            if let Some(message) = store.receive(reply) {
                debug!(%session_id, id = %message.id, "chat: reply delivered");
            }
        });

        // The previous task, if any, has already delivered: the responding
        // flag blocks a new submit until it does.
        *lock(&self.pending) = Some(handle);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
