use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use brevo_service::BrevoClient;
use db_service::SettingsStore;
use shared_lib::activity_log::ActivityLog;
use shared_lib::structs::Credentials;

pub mod relay;
pub mod route_handlers;

pub const DONATION_ROUTE: &str = "/givewp-brevo/v1/donation/";

#[derive(Clone, Debug, Default)]
pub struct RelayOptions {
    /// Treat non-2xx answers from Brevo as failures instead of successes
    pub strict_provider_status: bool,
    /// Required value of the `x-webhook-secret` header, `None` accepts anyone
    pub webhook_secret: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<dyn SettingsStore>,
    pub brevo: BrevoClient,
    pub activity_log: Arc<ActivityLog>,
    pub options: RelayOptions,
}

impl AppState {
    /// Appends to the activity log; a failed write is traced and otherwise ignored
    pub async fn record(&self, message: &str) {
        if let Err(e) = self.activity_log.append(message).await {
            tracing::error!("Failed to write activity log: {:?}", e);
        }
    }
}

/// Fills an empty settings store with the given values, used at startup with
/// `BREVO_API_KEY` / `BREVO_LIST_ID`. Returns whether anything was written.
pub async fn seed_credentials(
    store: &dyn SettingsStore,
    api_key: Option<String>,
    list_id: Option<String>,
) -> anyhow::Result<bool> {
    let current = store.get_credentials().await;
    if !current.api_key.is_empty() || !current.list_id.is_empty() {
        return Ok(false);
    }

    let api_key = api_key.unwrap_or_default();
    let list_id = list_id.unwrap_or_default();
    if api_key.is_empty() && list_id.is_empty() {
        return Ok(false);
    }

    store
        .set_credentials(&Credentials::new(api_key, list_id))
        .await?;
    Ok(true)
}

/**
 * main router for the app, the donation webhook route plus the admin pages
 * nested under the hashed admin path
 **/
pub fn get_main_router(state: AppState, admin_path: &str) -> Router {
    tracing::debug!("initializing router(s) ...");

    Router::new()
        .route(DONATION_ROUTE, post(route_handlers::donation::handler))
        .route(
            DONATION_ROUTE.trim_end_matches('/'),
            post(route_handlers::donation::handler),
        )
        .route("/healthcheck", get(|| async { "Ok" }))
        .nest(admin_path, get_admin_router())
        .merge(get_services_router())
        .with_state(state)
}

/**
 * settings form and log viewer
 **/
fn get_admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(route_handlers::settings::handler).post(route_handlers::settings::save_handler),
        )
        .route("/logs", get(route_handlers::logs::handler))
}

/**
 * router for the static assets
 **/
fn get_services_router() -> Router<AppState> {
    let assets_path = match std::env::current_dir() {
        Ok(path) => path.join("assets"),
        Err(_) => std::path::PathBuf::from("./assets"),
    };

    Router::new().nest_service("/assets", ServeDir::new(assets_path))
}
