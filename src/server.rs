//! HTTP surface: the GitLab webhook endpoint and a static usage hint.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::{
    base::{config::Config, types::Void},
    interaction::{classify, webhook_event},
    service::chat::ChatClient,
};

/// Header GitLab uses to carry the webhook shared secret.
const GITLAB_TOKEN_HEADER: &str = "X-Gitlab-Token";

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat: ChatClient,
}

/// Builds the application router.
///
/// The webhook route is registered with and without a trailing slash, since
/// GitLab webhook configurations commonly carry either form.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook/channel-id/:channel_id", post(gitlab_webhook))
        .route("/webhook/channel-id/:channel_id/", post(gitlab_webhook))
        .with_state(state)
}

/// Binds the listen address and serves the router.
pub async fn serve(state: AppState) -> Void {
    let address = state.config.listen_address.clone();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("Listening on {}", address);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Static usage hint for anyone poking the service root.
async fn root() -> Json<Value> {
    Json(json!({"Usage": "Configure a GitLab webhook for: /webhook/channel-id/<channel_id>"}))
}

/// Outcome of checking the webhook shared secret.
#[derive(Debug, PartialEq, Eq)]
enum AuthError {
    MissingToken,
    InvalidToken,
}

/// Checks the `X-Gitlab-Token` header against the configured secret.
/// No configured secret disables the check entirely.
fn verify_token(secret: Option<&str>, provided: Option<&str>) -> Result<(), AuthError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    match provided {
        None => Err(AuthError::MissingToken),
        Some(token) if token != secret => Err(AuthError::InvalidToken),
        Some(_) => Ok(()),
    }
}

/// The webhook entry point: authenticate, classify, then match-and-react.
///
/// Whatever happens on the chat side, the response to GitLab is a 200
/// acknowledgment; the only non-200 outcomes are the two auth rejections.
#[instrument(skip_all, fields(channel_id = %channel_id))]
async fn gitlab_webhook(State(state): State<AppState>, Path(channel_id): Path<String>, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    let provided = headers.get(GITLAB_TOKEN_HEADER).and_then(|value| value.to_str().ok());

    if let Err(err) = verify_token(state.config.gitlab_webhook_token.as_deref(), provided) {
        return match err {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Secret Token is mandatory, but not provided."}))),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, Json(json!({"detail": "Secret Token is invalid."}))),
        };
    }

    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("Discarding webhook body that is not valid JSON: {}", err);
            return (StatusCode::OK, Json(json!({"detail": "OK, but nothing to do."})));
        }
    };

    let Some(event) = classify::classify(&payload) else {
        return (StatusCode::OK, Json(json!({"detail": "OK, but nothing to do."})));
    };

    webhook_event::handle_webhook_event(&state.chat, &state.config, &channel_id, &event).await;

    (StatusCode::OK, Json(json!({"detail": "OK"})))
}
