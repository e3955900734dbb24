//! SharePoint client behavior against a wiremock double: token acquisition
//! followed by the file upload, and both failure paths.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sharebridge::config::Config;
use sharebridge::upload::{DocumentStore, SharePointClient, UploadError};

fn test_config(site_url: String) -> Config {
    Config {
        sharepoint_site_url: site_url,
        sharepoint_client_id: "client-id".to_string(),
        sharepoint_client_secret: "client-secret".to_string(),
        sharepoint_site_name: "TestSite".to_string(),
        sharepoint_doc_library: "Reports".to_string(),
        upstream_api_key: "unused".to_string(),
        upstream_api_url: "http://127.0.0.1:9/unused".to_string(),
    }
}

#[tokio::test]
async fn upload_acquires_a_token_then_posts_the_file_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_api/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-id"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-123", "token_type": "Bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("GetFolderByServerRelativeUrl"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"d": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = SharePointClient::new(&test_config(server.uri()));
    client
        .upload_file("data.csv", b"id\n1\n".to_vec())
        .await
        .expect("upload should succeed");
}

#[tokio::test]
async fn a_rejected_upload_surfaces_the_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_api/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-123"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("GetFolderByServerRelativeUrl"))
        .respond_with(ResponseTemplate::new(403).set_body_string("access denied"))
        .mount(&server)
        .await;

    let client = SharePointClient::new(&test_config(server.uri()));
    let err = client
        .upload_file("data.csv", b"id\n1\n".to_vec())
        .await
        .unwrap_err();

    match err {
        UploadError::Rejected { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "access denied");
        }
        other => panic!("expected Rejected error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_failed_token_request_aborts_before_any_upload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_api/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid client"))
        .mount(&server)
        .await;

    // No upload mock mounted: reaching the upload endpoint would 404 and
    // surface as Rejected instead of Token.
    let client = SharePointClient::new(&test_config(server.uri()));
    let err = client
        .upload_file("data.csv", b"id\n1\n".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Token(_)));
}
