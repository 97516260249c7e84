use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::info;

use crate::error::NoticeError;
use crate::notice::dispatcher::NoticeDispatcher;
use crate::notice::request::NoticeRequest;
use crate::provider::http::HttpWeixinApi;
use crate::server::server::AppState;

pub static NOTICE_PATH: &str = "/notice";

#[derive(Clone)]
pub struct NoticeState {
    pub dispatcher: Arc<NoticeDispatcher<HttpWeixinApi>>,
}

impl NoticeState {
    pub fn new(dispatcher: Arc<NoticeDispatcher<HttpWeixinApi>>) -> Self {
        Self { dispatcher }
    }

    pub fn router(&self) -> Router<AppState> {
        info!("served path: {}", NOTICE_PATH);
        Router::new().route(NOTICE_PATH, post(handle_notice))
    }
}

/// `POST /notice`: an empty body is an absent request.
async fn handle_notice(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<NoticeRequest>(&body) {
            Ok(request) => Some(request),
            Err(e) => return NoticeError::InvalidRequest(format!("malformed JSON body: {}", e)).into_response(),
        }
    };

    match state.notice_state.dispatcher.send_notice(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for NoticeError {
    fn into_response(self) -> Response {
        let status = match self {
            NoticeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            NoticeError::CredentialFetch(_) | NoticeError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        };
        let body = json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
