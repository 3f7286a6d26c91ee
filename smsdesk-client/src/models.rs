//! Wire types for the sender-data backend
//!
//! Shapes follow the backend's JSON contract. The request log carries a few
//! revision quirks that are normalized at this boundary: the `status` field
//! is string-or-list (see [`crate::status`]) and missing file ids arrive as
//! empty strings, which deserialize to `None` here.

use crate::status::{StatusSet, StatusStage};
use serde::{Deserialize, Deserializer, Serialize};

/// A telecom sender-identity record eligible for a data request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sender {
    /// Registered SMS sender name
    pub sender_name: String,

    /// Mobile network operator carrying the sender
    pub mobile_provider: String,

    /// Phone number registered to the sender
    pub phone_number: String,

    /// Full name of the registrant
    pub full_name: String,

    /// Registration date, `YYYY-MM-DD`
    pub date: String,
}

/// Body of `POST /request`: the selected field names plus the selected rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderRequest {
    pub fields: Vec<String>,
    pub rows: Vec<Sender>,
}

/// Backend acknowledgement of a submitted request
#[derive(Debug, Clone, Deserialize)]
pub struct RequestReceipt {
    pub request_id: String,
    #[serde(default)]
    pub message: String,
}

/// One entry of the request history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLog {
    pub request_id: String,

    /// Request date as the backend renders it (either `YYYY-MM-DD` or the
    /// long `%d %B %Y` form, depending on revision)
    pub thai_date: String,

    /// Reached workflow stages, normalized from either wire shape
    pub status: StatusSet,

    /// File id of the generated data-request PDF
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub pdf_sent_data_id: Option<String>,

    /// File id of the generated suspension-request PDF
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub pdf_sent_suspension_id: Option<String>,

    /// File id of the operator's Excel/CSV reply, once received
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub reply_file_id: Option<String>,

    /// Whether the current user has seen the latest status change
    #[serde(default)]
    pub is_read: bool,

    /// User ids that have acknowledged this entry
    #[serde(default)]
    pub read_by: Vec<String>,
}

/// A status-change notification from the polling feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub notification_id: String,
    pub request_id: String,

    /// The stage that triggered this notification
    pub status: String,
    pub thai_date: String,

    /// Creation timestamp as the backend renders it; older revisions omit it
    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub is_read: bool,
}

impl Notification {
    /// The triggering stage, when the tag is a known one
    pub fn stage(&self) -> Option<StatusStage> {
        StatusStage::from_tag(&self.status)
    }
}

/// Credentials sent to `POST /api/user/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account profile embedded in the login response and `/api/user/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of `POST /api/user/login`: profile plus bearer token
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub account: UserAccount,
    pub token: String,
}

/// The backend serializes absent file ids as `""`; treat those as `None`.
fn empty_string_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
