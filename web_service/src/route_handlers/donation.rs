use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::relay::{self, RelayError};
use crate::AppState;

pub const SECRET_HEADER: &str = "x-webhook-secret";

pub async fn handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(secret) = &state.options.webhook_secret {
        let presented = headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if presented != Some(secret.as_str()) {
            tracing::warn!("Rejected donation webhook without a valid {}", SECRET_HEADER);
            state
                .record(&format!("Error: {}", RelayError::Unauthorized))
                .await;
            return RelayError::Unauthorized.into_response();
        }
    }

    let payload = parse_payload(&body);
    tracing::debug!("Webhook request: {}", payload);

    match relay::relay_donation(&state, &payload).await {
        Ok(added) => added.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bodies that aren't JSON are kept as a string so they still show up in the
/// activity log, they never carry a donation.
fn parse_payload(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Object(Default::default());
    }

    match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Webhook body is not JSON: {}", e);
            Value::String(String::from_utf8_lossy(body).into_owned())
        }
    }
}
