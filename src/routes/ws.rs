//! WebSocket handler — one chat session per connection.
//!
//! DESIGN
//! ======
//! On upgrade, creates a `ChatSession` and enters a `select!` loop:
//! - Incoming widget frames → parse + dispatch by syscall
//! - Store events (new message, typing flag, input text) → push to widget
//! - Startup probe landing → push `probe:loaded`
//!
//! Handler functions only touch the session and return an `Outcome`; the
//! dispatch layer turns it into the reply frame. Everything the widget must
//! re-render arrives through store events, so replies stay small.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with the initial view + probe state
//! 2. Widget sends `chat:*` frames → dispatch → reply
//! 3. Store events → `chat:message` / `chat:typing` / `chat:input` pushes
//! 4. Probe payload arrives → `probe:loaded` (widget reveals the chat)
//! 5. Close → dispose session (pending reply is cancelled)

use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::input::{KeyPress, QuickAction};
use crate::chat::message::Message;
use crate::chat::view::MessageView;
use crate::chat::{ChatSession, StoreEvent, SubmitRejected};
use crate::frame::{Data, ErrorCode, Frame, Status};
use crate::probe::ProbeState;
use crate::state::AppState;

// =============================================================================
// OUTCOME + ERRORS
// =============================================================================

/// Result returned by handler functions.
enum Outcome {
    /// Send done+data to the widget.
    Reply(Data),
    /// Send empty done to the widget.
    Done,
}

#[derive(Debug, thiserror::Error)]
enum ChatFrameError {
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),
    #[error("unknown chat op: {0}")]
    UnknownOp(String),
    #[error("{0} required")]
    MissingField(&'static str),
    #[error("unknown quick action: {0}")]
    UnknownQuickAction(String),
    #[error("input is disabled while a response is pending")]
    InputDisabled,
}

impl ErrorCode for ChatFrameError {
    fn error_code(&self) -> &'static str {
        match self {
            ChatFrameError::UnknownPrefix(_) => "E_UNKNOWN_PREFIX",
            ChatFrameError::UnknownOp(_) => "E_UNKNOWN_OP",
            ChatFrameError::MissingField(_) => "E_MISSING_FIELD",
            ChatFrameError::UnknownQuickAction(_) => "E_UNKNOWN_QUICK_ACTION",
            ChatFrameError::InputDisabled => "E_INPUT_DISABLED",
        }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let session = state.new_chat_session();
    let session_id = session.id();
    let mut events = session.subscribe();
    let mut probe = state.probe.subscribe();

    let probe_state = probe.borrow_and_update().clone();
    let mut welcome = Frame::request("session:connected", view_data(&session)).with_session_id(session_id);
    welcome.data.extend(probe_data(&probe_state));
    if send_frame(&mut socket, &welcome).await.is_err() {
        session.dispose();
        return;
    }

    info!(%session_id, loaded = probe_state.is_loaded(), "ws: widget connected");

    let mut probe_open = true;
    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    WsMessage::Text(text) => {
                        for frame in process_inbound_text(&session, &text) {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
            event = events.recv() => {
                let frame = match event {
                    Ok(event) => event_frame(session_id, &event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%session_id, skipped, "ws: event stream lagged, resending view");
                        Frame::request("chat:view", view_data(&session)).with_session_id(session_id)
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            changed = probe.changed(), if probe_open => {
                let Some(frame) = probe_update(session_id, changed.is_ok(), &mut probe) else {
                    probe_open = false;
                    continue;
                };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    session.dispose();
    info!(%session_id, "ws: widget disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the widget.
///
/// Kept free of socket concerns so tests can drive a session end-to-end.
fn process_inbound_text(session: &ChatSession, text: &str) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(session_id = %session.id(), error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new())
                .with_session_id(session.id())
                .with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };
    req.session_id = Some(session.id());
    info!(session_id = %session.id(), id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "chat" => handle_chat(session, &req),
        other => Err(ChatFrameError::UnknownPrefix(other.to_string())),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Done) => vec![req.done()],
        Err(e) => vec![req.error_from(&e)],
    }
}

// =============================================================================
// CHAT HANDLERS
// =============================================================================

fn handle_chat(session: &ChatSession, req: &Frame) -> Result<Outcome, ChatFrameError> {
    match req.op() {
        "input" => {
            let text = req.data_str("text").ok_or(ChatFrameError::MissingField("text"))?;
            // The text field is locked while typing; quick actions are not.
            if session.is_responding() {
                return Err(ChatFrameError::InputDisabled);
            }
            session.set_input(text);
            Ok(Outcome::Done)
        }
        "quick" => {
            let key = req.data_str("action").ok_or(ChatFrameError::MissingField("action"))?;
            let action = QuickAction::from_key(key).ok_or_else(|| ChatFrameError::UnknownQuickAction(key.to_string()))?;
            session.apply_quick_action(action);
            Ok(Outcome::Done)
        }
        "send" => {
            let result = match req.data_str("text") {
                Some(text) => session.submit(text),
                None => session.submit_pending(),
            };
            Ok(Outcome::Reply(submit_data(result.map(Some))))
        }
        "key" => {
            let key = req.data_str("key").ok_or(ChatFrameError::MissingField("key"))?;
            let shift = req
                .data
                .get("shift")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            let press = KeyPress { key: key.to_string(), shift };
            Ok(Outcome::Reply(submit_data(session.handle_key(&press))))
        }
        "view" => Ok(Outcome::Reply(view_data(session))),
        other => Err(ChatFrameError::UnknownOp(other.to_string())),
    }
}

/// Reply payload for anything that may submit. Rejections are not errors:
/// the widget just sees `accepted: false`.
fn submit_data(result: Result<Option<Message>, SubmitRejected>) -> Data {
    let mut data = Data::new();
    match result {
        Ok(Some(message)) => {
            data.insert("accepted".into(), serde_json::json!(true));
            data.insert("message".into(), serde_json::to_value(MessageView::from(&message)).unwrap_or_default());
        }
        Ok(None) => {
            data.insert("accepted".into(), serde_json::json!(false));
        }
        Err(rejected) => {
            data.insert("accepted".into(), serde_json::json!(false));
            data.insert("reason".into(), serde_json::json!(rejected.to_string()));
        }
    }
    data
}

fn view_data(session: &ChatSession) -> Data {
    let mut data = Data::new();
    data.insert("view".into(), serde_json::to_value(session.view()).unwrap_or_default());
    data
}

/// Probe header fields: `probe_state` (loading/loaded) and the rendered `probe` lines.
fn probe_data(state: &ProbeState) -> Data {
    let mut data = Data::new();
    data.insert("probe_state".into(), serde_json::json!(if state.is_loaded() { "loaded" } else { "loading" }));
    data.insert("probe".into(), serde_json::json!(state.render_lines()));
    data
}

/// Push frame for a probe change. `None` means stop watching: the channel
/// closed, or the value changed without loading.
fn probe_update(session_id: Uuid, changed: bool, probe: &mut watch::Receiver<ProbeState>) -> Option<Frame> {
    if !changed {
        return None;
    }
    let current = probe.borrow_and_update().clone();
    if !current.is_loaded() {
        return None;
    }
    Some(Frame::request("probe:loaded", probe_data(&current)).with_session_id(session_id))
}

/// Translate a store event into the push frame the widget renders from.
fn event_frame(session_id: Uuid, event: &StoreEvent) -> Frame {
    let mut data = Data::new();
    let syscall = match event {
        StoreEvent::MessageAppended(message) => {
            data.insert("message".into(), serde_json::to_value(MessageView::from(message)).unwrap_or_default());
            data.insert("scroll_to".into(), serde_json::json!(message.id));
            "chat:message"
        }
        StoreEvent::RespondingChanged(responding) => {
            data.insert("typing".into(), serde_json::json!(responding));
            data.insert("input_enabled".into(), serde_json::json!(!responding));
            "chat:typing"
        }
        StoreEvent::InputChanged(text) => {
            data.insert("text".into(), serde_json::json!(text));
            "chat:input"
        }
    };
    Frame::request(syscall, data).with_session_id(session_id)
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.data_str("code").unwrap_or("-");
        let message = frame.data_str("message").unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket
        .send(WsMessage::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
