//! Contract tests for the outbound HTTP clients, against a local mock server.

use bigdecimal::BigDecimal;
use std::str::FromStr;

use fx_pipeline::ports::{IdentityError, IdentityProvider, RateInputs, ReportError, ReportGenerator};
use fx_pipeline::services::identity::HttpIdentityProvider;
use fx_pipeline::services::report::ReportServiceClient;

#[tokio::test]
async fn sign_in_parses_the_session_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/sign-in")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "token": "session-token",
                "user": {
                    "id": "7f1c2c1e-55a1-4b0a-9d59-0d0ddc3e2a11",
                    "email": "treasury@bank.test",
                    "full_name": "Ama Mensah",
                    "role": "treasury"
                }
            }"#,
        )
        .create_async()
        .await;

    let provider = HttpIdentityProvider::new(server.url());
    let session = provider.sign_in("treasury@bank.test", "pw").await.unwrap();

    mock.assert_async().await;
    assert_eq!(session.token, "session-token");
    assert_eq!(session.user.email, "treasury@bank.test");
}

#[tokio::test]
async fn sign_in_maps_401_to_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/sign-in")
        .with_status(401)
        .create_async()
        .await;

    let provider = HttpIdentityProvider::new(server.url());
    let err = provider.sign_in("x@bank.test", "bad").await.unwrap_err();
    assert!(matches!(err, IdentityError::Unauthorized(_)));
}

#[tokio::test]
async fn current_user_maps_5xx_to_upstream() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/user")
        .with_status(503)
        .create_async()
        .await;

    let provider = HttpIdentityProvider::new(server.url());
    let err = provider.current_user("some-token").await.unwrap_err();
    assert!(matches!(err, IdentityError::Upstream(_)));
}

fn rates() -> RateInputs {
    RateInputs {
        indicative_buying: BigDecimal::from_str("10.45").unwrap(),
        indicative_selling: BigDecimal::from_str("10.65").unwrap(),
    }
}

#[tokio::test]
async fn report_client_returns_the_full_bundle() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/generate-report")
        .with_status(200)
        .with_header(
            "content-disposition",
            "attachment; filename=\"fx_report_2025-08-10.zip\"",
        )
        .with_body(b"PK\x03\x04fake-zip")
        .create_async()
        .await;

    let client = ReportServiceClient::new(server.url());
    let bundle = client.generate(&rates(), &[]).await.unwrap();

    mock.assert_async().await;
    assert_eq!(bundle.filename, "fx_report_2025-08-10.zip");
    assert_eq!(&bundle.content[..4], b"PK\x03\x04");
}

#[tokio::test]
async fn report_client_rejects_failures_and_empty_bodies() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/generate-report")
        .with_status(500)
        .create_async()
        .await;

    let client = ReportServiceClient::new(server.url());
    let err = client.generate(&rates(), &[]).await.unwrap_err();
    assert!(matches!(err, ReportError::Failed(_)));

    // A 200 with no body is still a failed generation.
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/generate-report")
        .with_status(200)
        .create_async()
        .await;

    let client = ReportServiceClient::new(server.url());
    let err = client.generate(&rates(), &[]).await.unwrap_err();
    assert!(matches!(err, ReportError::Failed(_)));
}
