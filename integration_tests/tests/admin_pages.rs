use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use db_service::SettingsStore;
use integration_tests::{TestApp, ADMIN_PATH};
use shared_lib::structs::Credentials;
use web_service::DONATION_ROUTE;

async fn brevo_with_lists() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/contacts/lists"))
        .and(header("api-key", "xkeysib-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"id": 3, "name": "Donors"}, {"id": 9, "name": "Volunteers"}],
            "count": 2
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn healthcheck() {
    let app = TestApp::new("http://127.0.0.1:1", Credentials::default()).await;
    let (status, body) = app.get("/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Ok");
}

#[tokio::test]
async fn settings_page_lists_brevo_lists() {
    let server = brevo_with_lists().await;
    let app = TestApp::new(&server.uri(), Credentials::new("xkeysib-test", "9")).await;

    let (status, body) = app.get(&format!("{ADMIN_PATH}/settings")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"value="xkeysib-test""#));
    assert!(body.contains("Donors"));
    assert!(body.contains(r#"<option value="9" selected>Volunteers</option>"#));
    assert!(body.contains(r#"<option value="3">Donors</option>"#));
}

#[tokio::test]
async fn settings_page_without_api_key_uses_text_field() {
    let server = brevo_with_lists().await;
    let app = TestApp::new(&server.uri(), Credentials::default()).await;

    let (status, body) = app.get(&format!("{ADMIN_PATH}/settings")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<input type="text" id="list_id""#));
    assert!(!body.contains("<select"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn saving_settings_sanitizes_and_stores_credentials() {
    let server = brevo_with_lists().await;
    let app = TestApp::new(&server.uri(), Credentials::default()).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("{ADMIN_PATH}/settings"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("api_key=+xkeysib-test%0A&list_id=%3Cb%3E3%3C%2Fb%3E"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Settings saved."));
    assert_eq!(
        app.settings.get_credentials().await,
        Credentials::new("xkeysib-test", "3")
    );
    assert!(body.contains(r#"<option value="3" selected>Donors</option>"#));
}

#[tokio::test]
async fn saved_settings_are_used_by_the_webhook() {
    let server = brevo_with_lists().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(&server.uri(), Credentials::default()).await;
    let payload = json!({"data": {"donation": {"email": "a@x.com"}}});

    let (status, _) = app.post_json(DONATION_ROUTE, &payload).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let request = Request::builder()
        .method("POST")
        .uri(format!("{ADMIN_PATH}/settings"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("api_key=xkeysib-test&list_id=3"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post_json(DONATION_ROUTE, &payload).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logs_page_renders_entries_escaped() {
    let app = TestApp::new("http://127.0.0.1:1", Credentials::default()).await;
    app.activity_log
        .append("Webhook received: <script>alert(1)</script> - tail")
        .await
        .unwrap();

    let (status, body) = app.get(&format!("{ADMIN_PATH}/logs")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Log file created"));
    assert!(body.contains("&lt;script&gt;"));
    assert!(!body.contains("<script>"));
    assert!(body.contains("tail"));
}

#[tokio::test]
async fn admin_pages_are_not_served_outside_admin_path() {
    let app = TestApp::new("http://127.0.0.1:1", Credentials::default()).await;
    let (status, _) = app.get("/settings").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
