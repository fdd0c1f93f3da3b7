use std::time::Duration;

use super::*;
use crate::chat::message::Sender;
use crate::chat::simulator::{GREETING_REPLY, HELP_REPLY, ReplyDelay};

fn session() -> ChatSession {
    ChatSession::new(ConversationStore::new(), ResponseSimulator::seeded(1, ReplyDelay::default()))
}

fn message_count(session: &ChatSession) -> usize {
    session.with_store(|s| s.messages().len())
}

fn responding(session: &ChatSession) -> bool {
    session.with_store(ConversationStore::is_responding)
}

// =============================================================
// end-to-end timing
// =============================================================

#[tokio::test(start_paused = true)]
async fn hi_gets_greeting_after_delay() {
    let session = session();
    session.submit("hi").unwrap();

    assert!(responding(&session));
    assert_eq!(message_count(&session), 1);

    // Shortest possible delay has not elapsed yet.
    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(message_count(&session), 1);
    assert!(responding(&session));

    tokio::time::sleep(Duration::from_millis(2001)).await;
    session.with_store(|s| {
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[0].content, "hi");
        assert_eq!(s.messages()[0].sender, Sender::User);
        assert_eq!(s.messages()[1].content, GREETING_REPLY);
        assert_eq!(s.messages()[1].sender, Sender::Assistant);
        assert!(!s.is_responding());
    });

    // Nothing else arrives on its own.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(message_count(&session), 2);
}

#[tokio::test(start_paused = true)]
async fn second_submit_waits_for_first_reply() {
    let session = session();
    session.submit("please help").unwrap();
    assert_eq!(session.submit("again"), Err(SubmitRejected::Busy));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!responding(&session));
    assert_eq!(session.with_store(|s| s.messages()[1].content.clone()), HELP_REPLY);

    assert!(session.submit("again").is_ok());
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(message_count(&session), 4);
}

#[tokio::test(start_paused = true)]
async fn observers_notified_when_reply_lands() {
    let session = session();
    let mut rx = session.subscribe();
    session.submit("hello").unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let mut appended = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let StoreEvent::MessageAppended(m) = event {
            appended.push(m.sender);
        }
    }
    assert_eq!(appended, [Sender::User, Sender::Assistant]);
}

// =============================================================
// teardown
// =============================================================

#[tokio::test(start_paused = true)]
async fn dispose_during_pending_reply_leaves_store_untouched() {
    let session = session();
    let mut rx = session.subscribe();
    session.submit("hi").unwrap();
    while rx.try_recv().is_ok() {}

    session.dispose();
    tokio::time::sleep(Duration::from_secs(5)).await;

    session.with_store(|s| {
        assert!(s.is_disposed());
        assert_eq!(s.messages().len(), 1);
    });
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_session_with_pending_reply_is_safe() {
    let session = session();
    session.submit("hi").unwrap();
    drop(session);
    tokio::time::sleep(Duration::from_secs(5)).await;
}

#[tokio::test]
async fn dispose_is_idempotent() {
    let session = session();
    session.dispose();
    session.dispose();
    assert_eq!(session.submit("hi"), Err(SubmitRejected::Disposed));
}

// =============================================================
// input handling
// =============================================================

#[tokio::test(start_paused = true)]
async fn quick_action_fills_input_without_sending() {
    let session = session();
    session.apply_quick_action(QuickAction::DataAnalysis);

    assert_eq!(session.with_store(|s| s.pending_input().to_string()), "Help me analyze this data");
    assert_eq!(message_count(&session), 0);
    assert!(!responding(&session));
}

#[tokio::test(start_paused = true)]
async fn enter_submits_pending_input() {
    let session = session();
    session.set_input("what do you know");

    let shift_enter = KeyPress { key: "Enter".into(), shift: true };
    assert_eq!(session.handle_key(&shift_enter), Ok(None));
    assert_eq!(message_count(&session), 0);

    let enter = KeyPress { key: "Enter".into(), shift: false };
    let sent = session.handle_key(&enter).unwrap().expect("enter should submit");
    assert_eq!(sent.content, "what do you know");
    assert!(responding(&session));
}

#[tokio::test]
async fn enter_with_blank_input_is_ignored() {
    let session = session();
    session.set_input("   ");
    let enter = KeyPress { key: "Enter".into(), shift: false };
    assert_eq!(session.handle_key(&enter), Err(SubmitRejected::Empty));
    assert_eq!(message_count(&session), 0);
}
