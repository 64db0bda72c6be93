use axum::{extract::State, http::StatusCode, response::IntoResponse, Form};
use serde::Deserialize;

use shared_lib::structs::Credentials;
use shared_lib::utils::sanitize_text_field;

use super::html_template::HtmlTemplate;
use crate::AppState;

#[derive(Deserialize, Debug)]
pub struct SettingsForm {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    list_id: String,
}

pub async fn handler(State(state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(build_template(&state, None).await)
}

pub async fn save_handler(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> impl IntoResponse {
    let credentials = Credentials::new(
        sanitize_text_field(&form.api_key),
        sanitize_text_field(&form.list_id),
    );

    match state.settings.set_credentials(&credentials).await {
        Ok(()) => {
            tracing::info!("Brevo settings updated, list id {}", credentials.list_id);
            (
                StatusCode::OK,
                HtmlTemplate(build_template(&state, Some(Notice::Saved)).await),
            )
        }
        Err(e) => {
            tracing::error!("Failed to save Brevo settings: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HtmlTemplate(build_template(&state, Some(Notice::Failed(e.to_string()))).await),
            )
        }
    }
}

enum Notice {
    Saved,
    Failed(String),
}

async fn build_template(state: &AppState, notice: Option<Notice>) -> SettingsTemplate {
    let credentials = state.settings.get_credentials().await;

    let lists = if credentials.api_key.is_empty() {
        Vec::new()
    } else {
        state
            .brevo
            .get_lists(&credentials.api_key)
            .await
            .into_iter()
            .map(|(id, name)| ListOption {
                selected: credentials.list_id_number() == Some(id),
                id,
                name,
            })
            .collect()
    };

    let (notice, notice_is_error) = match notice {
        Some(Notice::Saved) => (Some("Settings saved.".to_string()), false),
        Some(Notice::Failed(error)) => (Some(format!("Failed to save settings: {error}")), true),
        None => (None, false),
    };

    SettingsTemplate {
        api_key: credentials.api_key,
        list_id: credentials.list_id,
        lists,
        notice,
        notice_is_error,
    }
}

struct ListOption {
    id: i64,
    name: String,
    selected: bool,
}

#[derive(askama::Template)]
#[template(path = "pages/settings.html")]
struct SettingsTemplate {
    api_key: String,
    list_id: String,
    lists: Vec<ListOption>,
    notice: Option<String>,
    notice_is_error: bool,
}
