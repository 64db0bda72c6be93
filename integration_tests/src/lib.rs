//! Shared setup for the end to end tests: an in-memory settings store, a
//! temporary activity log and a router pointed at a mock Brevo.

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brevo_service::BrevoClient;
use db_service::SettingsStore;
use shared_lib::activity_log::{ActivityLog, LogEntry};
use shared_lib::structs::Credentials;
use web_service::{AppState, RelayOptions};

pub const ADMIN_PATH: &str = "/admin/test";

static TRACING: Once = Once::new();

pub fn setup_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .init();
    });
}

#[derive(Default)]
pub struct MemorySettings {
    credentials: Mutex<Credentials>,
}

impl MemorySettings {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get_credentials(&self) -> Credentials {
        self.credentials
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    async fn set_credentials(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let mut guard = self
            .credentials
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        *guard = credentials.clone();
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub settings: Arc<MemorySettings>,
    pub activity_log: Arc<ActivityLog>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new(brevo_base_url: &str, credentials: Credentials) -> Self {
        Self::with_options(brevo_base_url, credentials, RelayOptions::default()).await
    }

    pub async fn with_options(
        brevo_base_url: &str,
        credentials: Credentials,
        options: RelayOptions,
    ) -> Self {
        setup_tracing();

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let activity_log = Arc::new(
            ActivityLog::open(dir.path().join("activity.log"), None)
                .await
                .expect("Failed to open activity log"),
        );
        let settings = Arc::new(MemorySettings::new(credentials));

        let state = AppState {
            settings: settings.clone(),
            brevo: BrevoClient::new(brevo_base_url, None).expect("Failed to build client"),
            activity_log: activity_log.clone(),
            options,
        };

        TestApp {
            router: web_service::get_main_router(state, ADMIN_PATH),
            settings,
            activity_log,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router failed");
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body())
            .await
            .expect("Failed to read body");
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");
        let (status, body) = self.send(request).await;
        let body = serde_json::from_str(&body).expect("response is not JSON");
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Log lines written after the file was created
    pub async fn log_entries(&self) -> Vec<LogEntry> {
        self.activity_log
            .read_entries()
            .await
            .expect("Failed to read activity log")
            .into_iter()
            .skip(1)
            .collect()
    }
}
