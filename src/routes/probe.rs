//! `GET /api/probe` — current startup probe state plus its rendered lines.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::probe::ProbeState;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    #[serde(flatten)]
    pub state: ProbeState,
    pub lines: Vec<String>,
}

impl From<ProbeState> for ProbeResponse {
    fn from(state: ProbeState) -> Self {
        let lines = state.render_lines();
        Self { state, lines }
    }
}

pub async fn get_probe(State(state): State<AppState>) -> Json<ProbeResponse> {
    let current = state.probe.borrow().clone();
    Json(current.into())
}
