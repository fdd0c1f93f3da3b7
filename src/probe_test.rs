use super::*;
use serde_json::json;

struct CannedEndpoint {
    result: fn() -> Result<TestPayload, ProbeError>,
}

#[async_trait]
impl TestEndpoint for CannedEndpoint {
    async fn fetch_test(&self) -> Result<TestPayload, ProbeError> {
        (self.result)()
    }
}

fn sample_payload() -> TestPayload {
    TestPayload {
        message: "Hello from the backend".into(),
        ksuid: Ksuid {
            string: "0ujsswThIGTUYm2K8FjOOfXtY1K".into(),
            timestamp: "2017-10-10 04:00:47 +0000 UTC".into(),
            payload: "B5A1CD34B5F99D1154FB6853345C9735".into(),
        },
    }
}

// =============================================================
// parsing
// =============================================================

#[test]
fn parse_valid_payload() {
    let body = json!({
        "message": "Hello from the backend",
        "ksuid": {
            "string": "0ujsswThIGTUYm2K8FjOOfXtY1K",
            "timestamp": "2017-10-10 04:00:47 +0000 UTC",
            "payload": "B5A1CD34B5F99D1154FB6853345C9735"
        }
    })
    .to_string();
    assert_eq!(parse_test_payload(&body).unwrap(), sample_payload());
}

#[test]
fn parse_missing_ksuid_errors() {
    let err = parse_test_payload(r#"{"message":"hi"}"#).unwrap_err();
    assert!(matches!(err, ProbeError::Parse(_)));
}

#[test]
fn parse_non_json_errors() {
    assert!(matches!(parse_test_payload("<html>502</html>"), Err(ProbeError::Parse(_))));
}

#[test]
fn test_url_trims_trailing_slash() {
    assert_eq!(test_url("http://api.test/"), "http://api.test/test");
    assert_eq!(test_url("http://api.test"), "http://api.test/test");
}

// =============================================================
// rendering
// =============================================================

#[test]
fn loading_renders_placeholder() {
    assert_eq!(ProbeState::Loading.render_lines(), vec![LOADING_TEXT.to_string()]);
}

#[test]
fn loaded_renders_four_lines() {
    let lines = ProbeState::Loaded(sample_payload()).render_lines();
    assert_eq!(
        lines,
        vec![
            "Message: Hello from the backend",
            "Timestamp: 2017-10-10 04:00:47 +0000 UTC",
            "Payload: B5A1CD34B5F99D1154FB6853345C9735",
            "KSUID: 0ujsswThIGTUYm2K8FjOOfXtY1K",
        ]
    );
}

#[test]
fn state_serializes_with_tag() {
    let loading = serde_json::to_value(ProbeState::Loading).unwrap();
    assert_eq!(loading, json!({"state": "loading"}));

    let loaded = serde_json::to_value(ProbeState::Loaded(sample_payload())).unwrap();
    assert_eq!(loaded["state"], "loaded");
    assert_eq!(loaded["message"], "Hello from the backend");
    assert_eq!(loaded["ksuid"]["payload"], "B5A1CD34B5F99D1154FB6853345C9735");
}

// =============================================================
// run
// =============================================================

#[tokio::test]
async fn successful_probe_stores_payload() {
    let endpoint = CannedEndpoint { result: || Ok(sample_payload()) };
    let (slot, _rx) = watch::channel(ProbeState::Loading);

    run_startup_probe(&endpoint, &slot).await;

    assert_eq!(*slot.borrow(), ProbeState::Loaded(sample_payload()));
}

#[tokio::test]
async fn failed_probe_stays_loading() {
    let endpoint = CannedEndpoint { result: || Err(ProbeError::Request("connection refused".into())) };
    let (slot, mut rx) = watch::channel(ProbeState::Loading);

    run_startup_probe(&endpoint, &slot).await;

    assert_eq!(*slot.borrow(), ProbeState::Loading);
    assert!(!rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_loaded());
}

#[tokio::test]
async fn unconfigured_probe_stays_loading() {
    let state = crate::state::test_helpers::test_app_state();
    spawn_startup_probe(state.clone()).await.unwrap();
    assert_eq!(*state.probe.borrow(), ProbeState::Loading);
}

#[tokio::test]
async fn earlier_subscriber_is_woken_when_payload_lands() {
    let state = crate::state::test_helpers::test_app_state();
    let mut rx = state.probe.subscribe();
    assert!(!rx.borrow_and_update().is_loaded());

    let endpoint = CannedEndpoint { result: || Ok(sample_payload()) };
    run_startup_probe(&endpoint, &state.probe).await;

    rx.changed().await.unwrap();
    let current = rx.borrow_and_update().clone();
    assert!(current.is_loaded());
    assert_eq!(current.render_lines()[0], "Message: Hello from the backend");
}
