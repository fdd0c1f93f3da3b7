//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the parsed config and the startup probe result. Chat sessions are
//! not shared: each websocket connection owns its own `ChatSession`.

use std::sync::Arc;

use tokio::sync::watch;

use crate::chat::{ChatSession, ConversationStore, ResponseSimulator};
use crate::config::AppConfig;
use crate::probe::ProbeState;

/// Clone is required by Axum — all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Startup probe result. Websocket tasks `subscribe()` to hear when it lands.
    pub probe: Arc<watch::Sender<ProbeState>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let (probe, _) = watch::channel(ProbeState::Loading);
        Self { config: Arc::new(config), probe: Arc::new(probe) }
    }

    /// Fresh widget conversation: welcome message, OS-seeded simulator.
    #[must_use]
    pub fn new_chat_session(&self) -> ChatSession {
        ChatSession::new(ConversationStore::with_welcome(), ResponseSimulator::new(self.config.reply_delay))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::Sender;

    #[test]
    fn new_state_starts_loading() {
        let state = test_helpers::test_app_state();
        assert_eq!(*state.probe.borrow(), ProbeState::Loading);
    }

    #[test]
    fn probe_updates_reach_clones() {
        let state = test_helpers::test_app_state();
        let mut rx = state.clone().probe.subscribe();
        state.probe.send_replace(ProbeState::Loading);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn chat_sessions_are_independent() {
        let state = test_helpers::test_app_state();
        let a = state.new_chat_session();
        let b = state.new_chat_session();

        assert_ne!(a.id(), b.id());
        a.set_input("only in a");
        assert_eq!(b.with_store(|s| s.pending_input().to_string()), "");
        assert_eq!(a.with_store(|s| s.messages()[0].sender), Sender::Assistant);
    }
}
