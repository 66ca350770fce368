//! `reqwest` implementation of [`LovebugApi`].
//!
//! Every request goes through [`send_json`], which turns non-success
//! statuses into [`ApiError::Status`] and logs a preview of any body that
//! fails to decode. Nothing here retries: reads are backed by sample data
//! in [`crate::DataAccess`] and writes must surface their failure.

use std::time::Duration;

use async_trait::async_trait;
use lovebug_report_models::{Hotspot, NewReport, Report, SearchFilter, Stats, StatsPayload};
use serde::de::DeserializeOwned;

use crate::{ApiError, LovebugApi};

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// HTTP client for the lovebug map API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Creates a client rooted at `base_url` (e.g.
    /// `http://localhost:8000/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl LovebugApi for HttpApi {
    async fn fetch_reports(&self, filter: &SearchFilter) -> Result<Vec<Report>, ApiError> {
        send_json(
            self.client
                .get(self.url("reports"))
                .query(&filter.report_query()),
        )
        .await
    }

    async fn fetch_hotspots(&self, filter: &SearchFilter) -> Result<Vec<Hotspot>, ApiError> {
        send_json(
            self.client
                .get(self.url("hotspots"))
                .query(&filter.hotspot_query()),
        )
        .await
    }

    async fn fetch_stats(&self, filter: &SearchFilter) -> Result<Stats, ApiError> {
        let payload: StatsPayload = send_json(
            self.client
                .get(self.url("stats"))
                .query(&filter.stats_query()),
        )
        .await?;
        Ok(payload.into())
    }

    async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError> {
        send_json(self.client.post(self.url("reports")).json(report)).await
    }

    async fn verify_report(&self, id: &str) -> Result<Report, ApiError> {
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        send_json(self.client.post(self.url(&format!("reports/{id}/verify")))).await
    }
}

/// Sends a request and decodes the JSON response body into `T`.
///
/// The body is read as text first so a decode failure can log what the
/// server actually sent.
async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;
    let url = response.url().to_string();
    let status = response.status();

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        let preview = preview(&text);
        log::warn!(
            "JSON decode failed\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {preview}",
            text.len(),
        );
        ApiError::Decode {
            message: format!("{e} (url={url}, received {} bytes)", text.len()),
        }
    })
}

/// Truncates `text` to [`BODY_PREVIEW_LEN`] bytes on a char boundary.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use lovebug_report_models::Severity;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serves exactly one canned HTTP response and returns the raw request
    /// head it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}/api/v1/"), handle)
    }

    #[tokio::test]
    async fn fetches_reports_with_query() {
        let body = r#"[{
            "id": "r-1", "content": "bugs",
            "location": {"latitude": 37.5, "longitude": 127.0},
            "severity": "critical", "platform": "kakao",
            "created_at": "2024-06-20T10:00:00Z"
        }]"#;
        let (base, server) = serve_once("200 OK", body).await;
        let api = HttpApi::new(&base, Duration::from_secs(5)).unwrap();
        let filter = SearchFilter {
            hours: Some(24),
            severity: Some(Severity::Critical),
            ..SearchFilter::default()
        };

        let reports = api.fetch_reports(&filter).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].severity, Severity::Critical);

        let request = server.await.unwrap();
        assert!(
            request.starts_with("GET /api/v1/reports?hours=24&severity=critical "),
            "unexpected request line: {request}"
        );
    }

    #[tokio::test]
    async fn server_error_becomes_status() {
        let (base, _server) = serve_once("500 Internal Server Error", "{}").await;
        let api = HttpApi::new(&base, Duration::from_secs(5)).unwrap();
        let err = api.fetch_hotspots(&SearchFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn garbled_body_becomes_decode_error() {
        let (base, _server) = serve_once("200 OK", "{\"total_reports\": ").await;
        let api = HttpApi::new(&base, Duration::from_secs(5)).unwrap();
        let err = api.fetch_stats(&SearchFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn stats_accepts_legacy_shape() {
        let body = r#"{
            "total_reports": 3,
            "reports_by_severity": {"low": 1, "medium": 1, "high": 1, "critical": 0}
        }"#;
        let (base, _server) = serve_once("200 OK", body).await;
        let api = HttpApi::new(&base, Duration::from_secs(5)).unwrap();
        let stats = api.fetch_stats(&SearchFilter::default()).await.unwrap();
        assert_eq!(stats.total_reports, 3);
        assert_eq!(stats.pending_reports, 3);
    }

    #[tokio::test]
    async fn verify_rejects_path_injection() {
        let api = HttpApi::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            api.verify_report("a/../b").await,
            Err(ApiError::InvalidId(_))
        ));
        assert!(matches!(
            api.verify_report("").await,
            Err(ApiError::InvalidId(_))
        ));
    }

    #[test]
    fn joins_urls_without_double_slashes() {
        let api = HttpApi::new("http://host/api/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://host/api/v1");
        assert_eq!(api.url("/reports"), "http://host/api/v1/reports");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let text = "가".repeat(300);
        let p = preview(&text);
        assert!(p.ends_with("..."));
        assert!(p.len() <= BODY_PREVIEW_LEN + 3);
    }
}
