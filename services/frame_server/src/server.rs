//! HTTP surface: the entry frame and the claim action.
//!
//! Both routes always answer `200 text/html`; failures are frame content.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::{
    claim::{ClaimRequest, ClaimWorkflow},
    config::{FrameConfig, FrameImages},
    frame::{render_entry, render_outcome},
};

#[derive(Clone)]
pub struct AppState {
    workflow: Arc<ClaimWorkflow>,
    images: Arc<FrameImages>,
    claim_url: Arc<str>,
}

impl AppState {
    pub fn new(workflow: ClaimWorkflow, config: &FrameConfig) -> Self {
        Self {
            workflow: Arc::new(workflow),
            images: Arc::new(config.images.clone()),
            claim_url: config.claim_url().into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(entry_frame))
        .route("/claim", post(claim_frame))
        .with_state(state)
}

fn html(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/html")], body).into_response()
}

async fn entry_frame(State(state): State<AppState>) -> Response {
    html(render_entry(&state.images, &state.claim_url))
}

async fn claim_frame(State(state): State<AppState>, body: Bytes) -> Response {
    let request = ClaimRequest::from_body(&body);
    let outcome = state.workflow.claim(&request).await;
    html(render_outcome(&outcome, &state.images))
}
