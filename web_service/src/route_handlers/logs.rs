use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use shared_lib::activity_log::LogEntry;

use super::html_template::HtmlTemplate;
use crate::AppState;

pub async fn handler(State(state): State<AppState>) -> Response {
    let entries = match state.activity_log.read_entries().await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::error!("Failed to read activity log: {:?}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    HtmlTemplate(LogsTemplate {
        log_path: state.activity_log.path().display().to_string(),
        entries,
    })
    .into_response()
}

#[derive(askama::Template)]
#[template(path = "pages/logs.html")]
struct LogsTemplate {
    log_path: String,
    entries: Vec<LogEntry>,
}
