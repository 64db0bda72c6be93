use std::{error::Error, fmt};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use brevo_service::ContactUpsertRequest;
use shared_lib::structs::{Donation, DonationWebhook};

use crate::AppState;

pub const SUCCESS_MESSAGE: &str = "Donor added successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    Unauthorized,
    EmailMissing,
    CredentialsMissing,
    Transport(String),
    ProviderRejected { status: u16, body: String },
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelayError::Unauthorized => write!(f, "Unauthorized"),
            RelayError::EmailMissing => write!(f, "Donor email missing"),
            RelayError::CredentialsMissing => write!(f, "Brevo API Key or List ID missing"),
            RelayError::Transport(message) => write!(f, "{message}"),
            RelayError::ProviderRejected { status, body } => {
                write!(f, "Brevo rejected contact ({status}): {body}")
            }
        }
    }
}

impl Error for RelayError {}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::EmailMissing => StatusCode::BAD_REQUEST,
            RelayError::CredentialsMissing | RelayError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::ProviderRejected { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Email of the contact that was handed to Brevo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorAdded {
    pub email: String,
}

impl IntoResponse for DonorAdded {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(json!({ "success": SUCCESS_MESSAGE, "email": self.email })),
        )
            .into_response()
    }
}

/// Forwards the donor in a webhook payload to the configured Brevo list.
///
/// The raw payload is logged first, then exactly one outcome line. No
/// outbound call happens unless the email and both credentials are present.
pub async fn relay_donation(state: &AppState, payload: &Value) -> Result<DonorAdded, RelayError> {
    state
        .record(&format!("Webhook received: {payload}"))
        .await;

    let result = forward(state, payload).await;

    match &result {
        Ok(added) => {
            tracing::info!("Donor {} added to Brevo", added.email);
            state
                .record(&format!("Success: Donor {} added to Brevo", added.email))
                .await;
        }
        Err(e) => {
            tracing::error!("Donation webhook failed: {}", e);
            state.record(&format!("Error: {e}")).await;
        }
    }

    result
}

async fn forward(state: &AppState, payload: &Value) -> Result<DonorAdded, RelayError> {
    let webhook = DonationWebhook::from_value(payload);
    let donor = webhook
        .donation()
        .and_then(Donation::normalize)
        .ok_or(RelayError::EmailMissing)?;

    let credentials = state.settings.get_credentials().await;
    let (api_key, list_id) = credentials.usable().ok_or(RelayError::CredentialsMissing)?;

    let contact = ContactUpsertRequest::new(&donor, list_id);
    let response = state
        .brevo
        .upsert_contact(api_key, &contact)
        .await
        .map_err(|e| RelayError::Transport(e.to_string()))?;

    if !response.status.is_success() {
        if state.options.strict_provider_status {
            return Err(RelayError::ProviderRejected {
                status: response.status.as_u16(),
                body: response.body,
            });
        }
        tracing::warn!(
            "Brevo answered {} for {}, reporting success anyway: {}",
            response.status,
            donor.email,
            response.body
        );
    }

    Ok(DonorAdded { email: donor.email })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(RelayError::EmailMissing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::CredentialsMissing.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Transport("connection refused".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(RelayError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            RelayError::ProviderRejected {
                status: 400,
                body: String::new()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(RelayError::EmailMissing.to_string(), "Donor email missing");
        assert_eq!(
            RelayError::CredentialsMissing.to_string(),
            "Brevo API Key or List ID missing"
        );
        assert_eq!(
            RelayError::Transport("timed out".to_string()).to_string(),
            "timed out"
        );
    }
}
