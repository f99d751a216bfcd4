//! The inbound side: one route that Telegram POSTs updates to, which also
//! answers GET as a health check.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::dispatcher::Dispatcher;
use crate::platform::MessagingApi;
use crate::update;

pub const MISSING_TOKEN: &str = "BOT_TOKEN is not set in environment";

/// Shared, read-only state behind every request.
pub struct AppState {
    bot_token: Option<String>,
    dispatcher: Dispatcher,
    api: Arc<dyn MessagingApi>,
}

impl AppState {
    pub fn new(
        bot_token: Option<String>,
        dispatcher: Dispatcher,
        api: Arc<dyn MessagingApi>,
    ) -> Self {
        Self {
            bot_token,
            dispatcher,
            api,
        }
    }
}

/// Status plus body of a webhook answer. Bodies are JSON except for 405.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(&'static str),
}

impl WebhookResponse {
    fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": message.into() }),
        )
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        match self.body {
            ResponseBody::Json(value) => (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                value.to_string(),
            )
                .into_response(),
            ResponseBody::Text(text) => (
                self.status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
        }
    }
}

/// Answer one webhook call.
pub async fn handle_request(state: &AppState, method: &Method, body: &[u8]) -> WebhookResponse {
    let Some(bot_token) = state.bot_token.as_deref() else {
        error!("Rejecting {} request: {}", method, MISSING_TOKEN);
        return WebhookResponse::error(MISSING_TOKEN);
    };

    if method == Method::GET {
        return WebhookResponse::json(
            StatusCode::OK,
            json!({ "ok": true, "message": "Webhook function is up" }),
        );
    }

    if method != Method::POST {
        warn!("Rejecting {} request", method);
        return WebhookResponse {
            status: StatusCode::METHOD_NOT_ALLOWED,
            body: ResponseBody::Text("Method Not Allowed"),
        };
    }

    let update = match update::parse(body) {
        Ok(update) => update,
        Err(e) => {
            error!("Failed to parse update: {}", e);
            return WebhookResponse::error(format!("Invalid update: {}", e));
        }
    };

    match state
        .dispatcher
        .handle(state.api.as_ref(), bot_token, &update)
        .await
    {
        Ok(result) => {
            let status = if result.get("ok").and_then(Value::as_bool) == Some(false) {
                error!("Bot API rejected the reply: {}", result);
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            debug!("Answering webhook with {}", status);
            WebhookResponse::json(status, result)
        }
        Err(e) => {
            error!("Error processing update: {:#}", e);
            WebhookResponse::error(format!("{:#}", e))
        }
    }
}

async fn webhook(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    handle_request(&state, &method, &body).await.into_response()
}

pub fn router(state: Arc<AppState>, path: &str) -> Router {
    Router::new().route(path, any(webhook)).with_state(state)
}
