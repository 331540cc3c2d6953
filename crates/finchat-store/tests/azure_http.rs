//! Azure Blob store against an in-process server speaking the Blob REST dialect

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use finchat_domain::DocumentStore;
use finchat_store::{AzureBlobStore, StoreError};
use std::collections::HashMap;
use tokio::net::TcpListener;

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn authorized(params: &HashMap<String, String>) -> bool {
    params.get("sig").map(String::as_str) == Some("secret")
}

/// Two-page listing: the first page hands out a continuation marker
async fn list_handler(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if !authorized(&params) {
        return (StatusCode::FORBIDDEN, "AuthenticationFailed".to_string());
    }
    assert_eq!(params.get("restype").map(String::as_str), Some("container"));
    assert_eq!(params.get("comp").map(String::as_str), Some("list"));

    let body = match params.get("marker").map(String::as_str) {
        None => "<EnumerationResults><Blobs><Blob><Name>acme-2020.pdf</Name></Blob></Blobs><NextMarker>page2</NextMarker></EnumerationResults>",
        Some("page2") => "<EnumerationResults><Blobs><Blob><Name>annual reports/acme-2021.pdf</Name></Blob></Blobs><NextMarker /></EnumerationResults>",
        Some(_) => "<EnumerationResults><Blobs /></EnumerationResults>",
    };
    (StatusCode::OK, body.to_string())
}

async fn blob_handler(
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !authorized(&params) {
        return (StatusCode::FORBIDDEN, Vec::new());
    }
    match name.as_str() {
        "acme-2020.pdf" => (StatusCode::OK, b"%PDF-2020".to_vec()),
        "annual reports/acme-2021.pdf" => (StatusCode::OK, b"%PDF-2021".to_vec()),
        _ => (StatusCode::NOT_FOUND, b"BlobNotFound".to_vec()),
    }
}

async fn store(sas: Option<&str>) -> AzureBlobStore {
    let app = Router::new()
        .route("/chatbot-data", get(list_handler))
        .route("/chatbot-data/*name", get(blob_handler));
    let base = spawn_server(app).await;
    AzureBlobStore::new(&base, "chatbot-data", sas.map(str::to_string)).unwrap()
}

#[tokio::test]
async fn test_list_follows_continuation_marker() {
    let store = store(Some("?sv=2021&sig=secret")).await;
    let names = store.list_names().await.unwrap();
    assert_eq!(names, vec!["acme-2020.pdf", "annual reports/acme-2021.pdf"]);
}

#[tokio::test]
async fn test_fetch_bytes() {
    let store = store(Some("sv=2021&sig=secret")).await;
    assert_eq!(store.fetch_bytes("acme-2020.pdf").await.unwrap(), b"%PDF-2020");
    assert_eq!(
        store.fetch_bytes("annual reports/acme-2021.pdf").await.unwrap(),
        b"%PDF-2021"
    );
}

#[tokio::test]
async fn test_missing_blob_is_not_found() {
    let store = store(Some("sig=secret")).await;
    let result = store.fetch_bytes("acme-1999.pdf").await;
    assert!(matches!(result, Err(StoreError::NotFound(name)) if name == "acme-1999.pdf"));
}

#[tokio::test]
async fn test_missing_signature_is_status_error() {
    let store = store(None).await;
    let result = store.list_names().await;
    assert!(matches!(result, Err(StoreError::Status { status: 403, .. })));
}

/// Accepts only Shared Key signed requests carrying the signing date
async fn signed_list_handler(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let has_date = headers.get("x-ms-date").is_some_and(|v| v.to_str().is_ok_and(|d| d.ends_with(" GMT")));
    let signature = authorization.strip_prefix("SharedKey devstoreaccount1:").unwrap_or_default();
    if !has_date || signature.len() != 44 || params.contains_key("sig") {
        return (StatusCode::FORBIDDEN, "AuthenticationFailed".to_string());
    }
    (
        StatusCode::OK,
        "<EnumerationResults><Blobs><Blob><Name>acme-2020.pdf</Name></Blob></Blobs><NextMarker /></EnumerationResults>"
            .to_string(),
    )
}

#[tokio::test]
async fn test_account_key_connection_string_signs_requests() {
    let app = Router::new().route("/chatbot-data", get(signed_list_handler));
    let base = spawn_server(app).await;
    let connection_string = format!(
        "AccountName=devstoreaccount1;AccountKey=c2VjcmV0LWtleQ==;BlobEndpoint={}",
        base
    );

    let store = AzureBlobStore::from_connection_string(&connection_string, "chatbot-data").unwrap();
    assert_eq!(store.list_names().await.unwrap(), vec!["acme-2020.pdf"]);
}
