//! DocQaApiClient - HTTP implementation of the upload and question coordinators.
//!
//! Talks to the document QA backend:
//! - `POST /upload` (multipart, field `file`) → `{ message, file_id, filename? }`
//! - `POST /ask` (JSON `{ question, session_id }`) → `{ response }`
//! - `GET /health` → `{ status }`

use async_trait::async_trait;
use docqa_core::config::BackendConfig;
use docqa_core::document::DocumentFile;
use docqa_core::remote::{
    AskError, QuestionCoordinator, UploadCoordinator, UploadError, UploadReceipt,
};
use docqa_core::session::SessionHandle;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the document QA HTTP API.
#[derive(Clone, Debug)]
pub struct DocQaApiClient {
    client: Client,
    base_url: String,
}

impl DocQaApiClient {
    /// Creates a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client from the `[backend]` configuration section.
    pub fn from_config(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Probes `GET /health` and returns the reported status.
    pub async fn health(&self) -> Result<String, String> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|err| format!("Health check request failed: {err}"))?;

        let response = ensure_success(response).await?;
        let parsed: HealthResponse = response
            .json()
            .await
            .map_err(|err| format!("Failed to parse health response: {err}"))?;
        Ok(parsed.status)
    }

    async fn send_upload(&self, file: &DocumentFile) -> Result<UploadResponse, String> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(&file.content_type())
            .map_err(|err| format!("Invalid content type: {err}"))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|err| format!("Upload request failed: {err}"))?;

        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|err| format!("Failed to parse upload response: {err}"))
    }

    async fn send_question(&self, body: &AskRequest<'_>) -> Result<AskResponse, String> {
        let response = self
            .client
            .post(self.endpoint("ask"))
            .json(body)
            .send()
            .await
            .map_err(|err| format!("Ask request failed: {err}"))?;

        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|err| format!("Failed to parse ask response: {err}"))
    }
}

#[async_trait]
impl UploadCoordinator for DocQaApiClient {
    async fn submit(&self, file: &DocumentFile) -> Result<UploadReceipt, UploadError> {
        file.validate()?;
        tracing::debug!(
            "[DocQaApiClient] Uploading '{}' ({} bytes)",
            file.file_name(),
            file.size()
        );

        let parsed = self
            .send_upload(file)
            .await
            .map_err(UploadError::TransportFailed)?;

        if parsed.file_id.trim().is_empty() {
            return Err(UploadError::TransportFailed(
                "Upload response did not include a file_id".to_string(),
            ));
        }

        Ok(UploadReceipt {
            handle: SessionHandle::new(parsed.file_id),
            message: parsed.message,
            filename: parsed.filename,
        })
    }
}

#[async_trait]
impl QuestionCoordinator for DocQaApiClient {
    async fn ask(
        &self,
        question: &str,
        handle: Option<&SessionHandle>,
    ) -> Result<String, AskError> {
        let request = AskRequest {
            question,
            session_id: handle.map(SessionHandle::as_str),
        };

        let parsed = self
            .send_question(&request)
            .await
            .map_err(AskError::TransportFailed)?;
        Ok(parsed.response)
    }
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    session_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(alias = "answer")]
    response: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    message: String,
    file_id: String,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// FastAPI error body: `detail` is a string for `HTTPException`, a list for
/// validation errors.
#[derive(Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(map_http_error(status, &body))
}

fn map_http_error(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| match wrapper.detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        })
        .unwrap_or_else(|_| body.to_string());

    if detail.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DocQaApiClient {
        DocQaApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_upload_success_returns_handle_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header_exists("content-type"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"report.pdf\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Document uploaded and indexed successfully",
                "file_id": "h1",
                "filename": "report.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = DocumentFile::new("report.pdf", b"%PDF-1.4 body".to_vec());
        let receipt = client_for(&server).submit(&file).await.unwrap();

        assert_eq!(receipt.handle, SessionHandle::new("h1"));
        assert_eq!(receipt.message, "Document uploaded and indexed successfully");
        assert_eq!(receipt.filename.as_deref(), Some("report.pdf"));
    }

    #[tokio::test]
    async fn test_upload_of_unsupported_type_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "ok",
                "file_id": "h1"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let file = DocumentFile::new("diagram.png", vec![1, 2, 3]);
        let err = client_for(&server).submit(&file).await.unwrap_err();

        assert!(err.is_rejected());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "detail": "Error processing document: boom"
            })))
            .mount(&server)
            .await;

        let file = DocumentFile::new("report.pdf", b"%PDF".to_vec());
        let err = client_for(&server).submit(&file).await.unwrap_err();

        assert_eq!(
            err,
            UploadError::TransportFailed("HTTP 500: Error processing document: boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_id_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "ok",
                "file_id": ""
            })))
            .mount(&server)
            .await;

        let file = DocumentFile::new("notes.txt", b"hello".to_vec());
        let err = client_for(&server).submit(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::TransportFailed(_)));
    }

    #[tokio::test]
    async fn test_ask_sends_question_and_session_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(body_json(serde_json::json!({
                "question": "What is the summary?",
                "session_id": "h1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "It's a quarterly report."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = SessionHandle::new("h1");
        let answer = client_for(&server)
            .ask("What is the summary?", Some(&handle))
            .await
            .unwrap();

        assert_eq!(answer, "It's a quarterly report.");
    }

    #[tokio::test]
    async fn test_ask_without_session_sends_null_and_accepts_answer_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(body_json(serde_json::json!({
                "question": "Anything?",
                "session_id": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "I'm sorry, I don't know the answer based on the uploaded documents."
            })))
            .mount(&server)
            .await;

        let answer = client_for(&server).ask("Anything?", None).await.unwrap();
        assert!(answer.starts_with("I'm sorry"));
    }

    #[tokio::test]
    async fn test_ask_failure_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("q", None).await.unwrap_err();
        assert_eq!(err, AskError::TransportFailed("HTTP 500: internal".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_failure() {
        let client = DocQaApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.ask("q", None).await.unwrap_err();
        assert!(matches!(err, AskError::TransportFailed(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})),
            )
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).health().await.unwrap(), "healthy");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = DocQaApiClient::with_client(Client::new(), "http://localhost:8000/");
        assert_eq!(client.endpoint("ask"), "http://localhost:8000/ask");
    }

    #[test]
    fn test_map_http_error_with_validation_detail() {
        let body = r#"{"detail":[{"loc":["body","question"],"msg":"field required"}]}"#;
        let message = map_http_error(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(message.starts_with("HTTP 422: [{"));
        assert!(message.contains("field required"));
    }
}
