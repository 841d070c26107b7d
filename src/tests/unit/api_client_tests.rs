//! HttpDocumentClient against a wiremock backend.

use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::super::common::*;
use crate::core::api::{no_progress, ApiError, DocumentApi, DocumentId, UploadFile, UPLOAD_FAILED_MESSAGE};

// ============================================================================
// list_documents
// ============================================================================

#[tokio::test]
async fn test_list_sends_page_and_reads_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page_json("d", 3, 13)))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server.uri()).list_documents(2).await.unwrap();
    assert_eq!(page.documents.len(), 3);
    assert_eq!(page.total, 13);
    assert_eq!(page.total_pages(), 2);
    assert_eq!(page.documents[0].id, DocumentId::new("d0"));
    assert!(page.documents[0].upload_date.is_some());
}

#[tokio::test]
async fn test_list_missing_pagination_is_structural() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server.uri()).list_documents(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Structural(_)), "got {err:?}");
}

#[tokio::test]
async fn test_list_page_zero_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server.uri()).list_documents(0).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_list_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let err = client_for(&server.uri()).list_documents(1).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.body(), Some("database offline"));
    assert!(err.is_retriable());
}

// ============================================================================
// get_document
// ============================================================================

#[tokio::test]
async fn test_get_document_decodes_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysed_document_json("abc123")))
        .mount(&server)
        .await;

    let doc = client_for(&server.uri())
        .get_document(&DocumentId::new("abc123"))
        .await
        .unwrap();
    assert_eq!(doc.id.as_str(), "abc123");
    assert_eq!(doc.summary(), Ok(Some("A services agreement between Acme and Globex.")));
    assert_eq!(doc.risks().unwrap().map(<[_]>::len), Some(3));
    assert!(doc.entities().unwrap().is_some_and(|e| e.contains_key("parties")));
}

#[tokio::test]
async fn test_get_failed_document_has_no_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/f1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failed_document_json("f1")))
        .mount(&server)
        .await;

    let doc = client_for(&server.uri())
        .get_document(&DocumentId::new("f1"))
        .await
        .unwrap();
    assert!(doc.analysis.is_none());
    assert_eq!(doc.text(), Ok(None));
}

#[tokio::test]
async fn test_get_document_with_wrong_typed_risks_still_loads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "d1",
            "text": "full text",
            "analysis": { "summary": "ok", "risks": "oops", "entities": { "PARTY": ["Acme"] } }
        })))
        .mount(&server)
        .await;

    let doc = client_for(&server.uri())
        .get_document(&DocumentId::new("d1"))
        .await
        .unwrap();
    assert_eq!(doc.summary(), Ok(Some("ok")));
    assert!(doc.risks().is_err());
    assert_eq!(doc.text(), Ok(Some("full text")));
}

#[tokio::test]
async fn test_get_document_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "Not Found",
            "message": "Document not found"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .get_document(&DocumentId::new("gone"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_document_without_id_is_structural() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/x"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "filename": "x.pdf" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .get_document(&DocumentId::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Structural(_)), "got {err:?}");
}

// ============================================================================
// delete_document
// ============================================================================

#[tokio::test]
async fn test_delete_document() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/d9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "Document deleted successfully" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let confirmation = client_for(&server.uri())
        .delete_document(&DocumentId::new("d9"))
        .await
        .unwrap();
    assert_eq!(confirmation.id, DocumentId::new("d9"));
}

#[tokio::test]
async fn test_delete_missing_document() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/d9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .delete_document(&DocumentId::new("d9"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// upload_document
// ============================================================================

#[tokio::test]
async fn test_upload_sends_multipart_and_reports_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"nda.pdf\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "new1",
            "filename": "nda.pdf",
            "status": "processed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (on_progress, seen) = recording_progress();
    let file = UploadFile::new("nda.pdf", vec![b'%'; 2048]);
    let receipt = client_for(&server.uri())
        .upload_document(file, on_progress)
        .await
        .unwrap();

    assert_eq!(receipt.id, DocumentId::new("new1"));
    assert_eq!(receipt.status.as_deref(), Some("processed"));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.len() > 1, "expected several progress reports, got {seen:?}");
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "not increasing: {seen:?}");
}

#[tokio::test]
async fn test_upload_validation_message_comes_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Bad Request",
            "message": "File type not allowed"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .upload_document(UploadFile::new("nda.pdf", vec![1u8; 16]), no_progress())
        .await
        .unwrap_err();
    assert!(matches!(&err, ApiError::Validation(m) if m == "File type not allowed"));
    assert_eq!(err.upload_message(), "File type not allowed");
}

#[tokio::test]
async fn test_upload_server_error_uses_fallback_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .upload_document(UploadFile::new("nda.pdf", vec![1u8; 16]), no_progress())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.upload_message(), UPLOAD_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_upload_network_failure() {
    // Nothing listens on the discard port
    let client = client_for("http://127.0.0.1:9");
    let err = client
        .upload_document(UploadFile::new("nda.pdf", vec![1u8; 16]), no_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    assert_eq!(err.upload_message(), UPLOAD_FAILED_MESSAGE);
}

// ============================================================================
// health_check
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "LegalMate API is running" })),
        )
        .mount(&server)
        .await;

    let status = client_for(&server.uri()).health_check().await.unwrap();
    assert_eq!(status.message, "LegalMate API is running");
}
