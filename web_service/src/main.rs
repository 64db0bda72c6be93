use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;

use axum::{
    body::Body,
    http::{Request, Uri},
    middleware::Next,
    response::Response,
};
use tower_http::compression::{
    predicate::{DefaultPredicate, NotForContentType, Predicate},
    CompressionLayer,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use brevo_service::BrevoClient;
use db_service::DbService;
use shared_lib::activity_log::ActivityLog;
use shared_lib::env_utils;
use shared_lib::utils;
use web_service::{AppState, RelayOptions, DONATION_ROUTE};

struct RequestUri(Uri);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("initializing app state ...");

    let db = DbService::open(&env_utils::get_db_path(), &env_utils::get_db_encryption_key())
        .await
        .context("error while opening settings database")?;
    db.init_tables().await?;
    if web_service::seed_credentials(
        &db,
        env_utils::get_brevo_api_key(),
        env_utils::get_brevo_list_id(),
    )
    .await
    .context("error while seeding Brevo settings")?
    {
        tracing::info!("Seeded Brevo settings from environment");
    }

    let activity_log = ActivityLog::open(
        env_utils::get_activity_log_path(),
        env_utils::get_activity_log_max_bytes(),
    )
    .await
    .context("error while opening activity log")?;

    let options = RelayOptions {
        strict_provider_status: env_utils::get_brevo_strict_status(),
        webhook_secret: env_utils::get_webhook_shared_secret(),
    };
    if options.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SHARED_SECRET is not set, the donation webhook accepts any caller");
    }

    let state = AppState {
        settings: Arc::new(db),
        brevo: BrevoClient::from_env()?,
        activity_log: Arc::new(activity_log),
        options,
    };

    let port = env_utils::get_port();
    let addr = format!("[::]:{port}")
        .parse::<std::net::SocketAddr>()
        .context("unable to parse address")?;
    let host_uri = env_utils::get_host_uri();
    let admin_path = format!("/admin/{}", env_utils::get_admin_secret());

    tracing::info!("Starting server at host: {}", host_uri);
    tracing::info!("Donation webhook route: {}{}", host_uri, DONATION_ROUTE);
    tracing::info!("Admin settings page: {}{}/settings", host_uri, admin_path);

    let predicate = DefaultPredicate::new().and(NotForContentType::new("application/json"));
    let compression_layer = CompressionLayer::new().gzip(true).compress_when(predicate);

    axum::Server::bind(&addr)
        .serve(
            web_service::get_main_router(state, &admin_path)
                .layer(axum::middleware::from_fn(
                    |request: Request<Body>, next: Next<Body>| async move {
                        let uri = request.uri().clone();

                        let mut response = next.run(request).await;

                        response.extensions_mut().insert(RequestUri(uri));

                        response
                    },
                ))
                .layer(TraceLayer::new_for_http().on_response(
                    |response: &Response, latency: std::time::Duration, _span: &tracing::Span| {
                        let url = match response.extensions().get::<RequestUri>().map(|r| &r.0) {
                            Some(uri) => uri.to_string(),
                            None => "unknown".to_string(),
                        };
                        let status = response.status();
                        let latency = utils::duration_to_ms_string(latency);

                        if url == "/healthcheck" {
                            tracing::trace!("{} {} {}", url, status, latency);
                            return;
                        }

                        tracing::debug!("{} {} {}", url, status, latency);
                    },
                ))
                .layer(compression_layer)
                .into_make_service(),
        )
        .await
        .context("error while starting API server")?;

    Ok(())
}
