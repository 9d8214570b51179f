use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::json;

use super::*;
use crate::session::MemoryTokenStore;
use crate::test_support::{STUB_TOKEN, STUB_USERNAME, StubBackend};

fn anonymous() -> Session {
    Session::open(MemoryTokenStore::new()).unwrap()
}

fn authed() -> Session {
    Session::open(MemoryTokenStore::with_token(STUB_TOKEN)).unwrap()
}

#[test]
fn delete_link_path_embeds_id() {
    assert_eq!(delete_link_path("65f0c1"), "/delete_link/65f0c1");
}

#[test]
fn new_rejects_relative_base_url() {
    let config = ClientConfig { base_url: "localhost".to_owned(), ..ClientConfig::default() };
    assert!(matches!(ApiClient::new(&config), Err(ApiError::InvalidBaseUrl(_))));
}

#[test]
fn new_trims_trailing_slash() {
    let config = ClientConfig { base_url: "http://localhost:5000/".to_owned(), ..ClientConfig::default() };
    let client = ApiClient::new(&config).unwrap();
    assert_eq!(client.base_url(), "http://localhost:5000");
    assert_eq!(client.url(USER_PATH), "http://localhost:5000/user");
}

#[tokio::test]
async fn anonymous_requests_send_json_content_type_without_auth() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    client.ping(&anonymous()).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn authenticated_requests_carry_bearer_token() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let user = client.current_user(&authed()).await.unwrap();
    assert_eq!(user.username, STUB_USERNAME);
    let expected = format!("Bearer {STUB_TOKEN}");
    assert_eq!(backend.requests()[0].authorization.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn caller_options_override_and_extend_headers() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.linkmark+json"));
    headers.insert("x-extra", HeaderValue::from_static("yes"));
    let options = RequestOptions { headers, body: None };
    client.request(&authed(), Method::GET, USER_PATH, options).await.unwrap();

    let recorded = &backend.requests()[0];
    assert_eq!(recorded.content_type.as_deref(), Some("application/vnd.linkmark+json"));
    assert_eq!(recorded.extra.as_deref(), Some("yes"));
    assert!(recorded.authorization.is_some());
}

#[tokio::test]
async fn non_success_status_surfaces_backend_error_message() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let body = SignupRequest { username: "bob", email: "taken@example.com", password: "Abcdefg1" };
    let err = client.signup(&anonymous(), &body).await.unwrap_err();
    assert!(matches!(&err, ApiError::Status { status: 409, message } if message == "Email already registered"));
    assert_eq!(err.user_message(), "Email already registered");
    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn signup_sends_all_three_fields() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let body = SignupRequest { username: "bob", email: "bob@example.com", password: "Abcdefg1" };
    let response = client.signup(&anonymous(), &body).await.unwrap();
    assert_eq!(response.message.as_deref(), Some("User registered!"));
    assert_eq!(
        backend.requests()[0].body,
        Some(json!({ "username": "bob", "email": "bob@example.com", "password": "Abcdefg1" }))
    );
}

#[tokio::test]
async fn login_returns_token() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let token = client
        .login(&anonymous(), &LoginRequest { email: "bob@example.com", password: "Abcdefg1" })
        .await
        .unwrap();
    assert_eq!(token, STUB_TOKEN);
}

#[tokio::test]
async fn login_without_token_in_body_is_missing_token() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let err = client
        .login(&anonymous(), &LoginRequest { email: "notoken@example.com", password: "x" })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[tokio::test]
async fn missing_auth_uses_msg_field_from_body() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let err = client.user_links(&anonymous()).await.unwrap_err();
    assert!(matches!(&err, ApiError::Status { status: 401, message } if message == "Missing Authorization Header"));
}

#[tokio::test]
async fn link_crud_round_trip() {
    let backend = StubBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();
    let session = authed();

    client
        .add_link(&session, &NewLink { title: "Rust", url: "https://rust-lang.org" })
        .await
        .unwrap();
    let links = client.user_links(&session).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].title, "Rust");

    let ack = client.delete_link(&session, &links[0].id).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Link deleted!"));
    assert!(client.user_links(&session).await.unwrap().is_empty());
}

#[tokio::test]
async fn network_failure_is_network_error() {
    // Bind and drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig { base_url: format!("http://{addr}"), ..ClientConfig::default() };
    let client = ApiClient::new(&config).unwrap();
    let err = client.ping(&anonymous()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
