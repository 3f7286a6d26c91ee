//! HTTP wrappers for the sender-data backend
//!
//! One method per endpoint. Each wrapper builds the URL from the configured
//! backend base, attaches `Authorization: Bearer <token>` where the endpoint
//! requires it, issues exactly one request and maps any non-2xx answer to
//! [`ClientError::Backend`]. There is no retry and no backoff; transient
//! failures surface to the caller immediately. A per-request timeout is set
//! on the underlying client so a dead backend cannot hang a page load.

use crate::auth::Session;
use crate::date_filter::DateRange;
use crate::error::{ClientError, Result};
use crate::models::{
    LoginRequest, LoginResponse, Notification, RequestLog, RequestReceipt, Sender, SenderRequest,
    UserAccount,
};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// What kind of artifact a download is expected to be
///
/// Only used for the fallback filename when the backend omits
/// `Content-Disposition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// Generated request/suspension PDF
    Pdf,
    /// Operator reply data (Excel/CSV)
    Data,
}

/// A successfully downloaded artifact
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Typed client for the backend's HTTP API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given backend origin
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration(
                "backend URL must not be empty".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a bearer token and account profile
    ///
    /// A 401 maps to [`ClientError::AuthenticationFailed`] so the login page
    /// can show an inline message instead of a generic backend error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        debug!(email, "logging in");
        let response = self
            .http
            .post(self.url("/api/user/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            warn!(email, "login rejected");
            return Err(ClientError::AuthenticationFailed(body));
        }
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch the profile behind a token (also serves as a token check)
    pub async fn me(&self, session: &Session) -> Result<UserAccount> {
        let response = self
            .http
            .get(self.url("/api/user/me"))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// List sender rows, optionally bounded by an inclusive date range
    pub async fn available_senders(&self, range: &DateRange) -> Result<Vec<Sender>> {
        let mut request = self.http.get(self.url("/available-senders"));
        if let Some(start) = range.start {
            request = request.query(&[("start", start.format("%Y-%m-%d").to_string())]);
        }
        if let Some(end) = range.end {
            request = request.query(&[("end", end.format("%Y-%m-%d").to_string())]);
        }
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Submit a field+row selection as a new request
    pub async fn create_request(
        &self,
        session: &Session,
        request: &SenderRequest,
    ) -> Result<RequestReceipt> {
        debug!(
            rows = request.rows.len(),
            fields = request.fields.len(),
            "submitting sender request"
        );
        let response = self
            .http
            .post(self.url("/request"))
            .header(AUTHORIZATION, session.bearer())
            .json(request)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// List the current user's request logs, newest first
    pub async fn request_logs(&self, session: &Session) -> Result<Vec<RequestLog>> {
        let response = self
            .http
            .get(self.url("/api/requests"))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// List the current user's notifications, newest first
    pub async fn notifications(&self, session: &Session) -> Result<Vec<Notification>> {
        let response = self
            .http
            .get(self.url("/api/notifications"))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Mark one notification as read
    pub async fn mark_notification_read(
        &self,
        session: &Session,
        notification_id: &str,
    ) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/api/notification/mark-read/{notification_id}")))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Download a stored artifact (PDF or reply data)
    ///
    /// The filename comes from `Content-Disposition`; when the header is
    /// absent or unparseable the fallback is `document_<id>.pdf` for PDFs
    /// and `data_<id>.xlsx` for reply data. A non-2xx answer is an error and
    /// yields no file value at all.
    pub async fn download_file(
        &self,
        session: &Session,
        file_id: &str,
        kind: DownloadKind,
    ) -> Result<DownloadedFile> {
        let response = self
            .http
            .get(self.url(&format!("/api/file/{file_id}")))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;
        let response = check(response).await?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| match kind {
                DownloadKind::Pdf => format!("document_{file_id}.pdf"),
                DownloadKind::Data => format!("data_{file_id}.xlsx"),
            });
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        debug!(file_id, filename, size = bytes.len(), "downloaded file");
        Ok(DownloadedFile {
            bytes,
            filename,
            content_type,
        })
    }
}

/// Map a non-2xx response to [`ClientError::Backend`], logging the body
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body, "backend request failed");
    Err(ClientError::backend(status.as_u16(), &body))
}

/// Extract the quoted or bare filename from a `Content-Disposition` value
fn filename_from_content_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let rest = rest.trim();
    let name = if let Some(stripped) = rest.strip_prefix('"') {
        stripped.split('"').next()?
    } else {
        rest.split(';').next()?.trim()
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
