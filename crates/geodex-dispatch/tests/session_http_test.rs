//! HTTP-level tests for the Earthdata Login session.

use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geodex_core::Error;
use geodex_dispatch::EarthdataSession;

fn session_for(server: &MockServer) -> EarthdataSession {
    EarthdataSession::new("jane", "hunter2")
        .with_token_url(format!("{}/api/users/tokens", server.uri()))
}

#[tokio::test]
async fn login_uses_existing_edl_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/tokens"))
        .and(basic_auth("jane", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "access_token": "edl-existing" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert_eq!(
        session.ensure_authenticated().await.unwrap().as_deref(),
        Some("edl-existing")
    );
    // Token is cached; a second call must not hit the endpoint again.
    assert_eq!(
        session.ensure_authenticated().await.unwrap().as_deref(),
        Some("edl-existing")
    );
}

#[tokio::test]
async fn login_mints_token_when_account_has_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users/token"))
        .and(basic_auth("jane", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
            { "access_token": "edl-minted" }
        )))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert_eq!(
        session.ensure_authenticated().await.unwrap().as_deref(),
        Some("edl-minted")
    );
}

#[tokio::test]
async fn login_failure_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/tokens"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = session_for(&server).ensure_authenticated().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}
