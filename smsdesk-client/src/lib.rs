//! smsdesk backend client
//!
//! This library provides the client layer for the smsdesk administrative
//! dashboard: typed wrappers for the sender-data backend's HTTP endpoints,
//! the session/auth abstraction, and the view-model state the web layer
//! renders (request status checklists, date-range filtering, field/row
//! selection, notification polling).
//!
//! The backend itself (request storage, PDF generation, the actual SMS
//! suspension) is an external system reached purely over HTTP.

pub mod api;
pub mod auth;
pub mod date_filter;
pub mod models;
pub mod poller;
pub mod selection;
pub mod status;

mod error;

pub use api::{ApiClient, DownloadKind, DownloadedFile};
pub use auth::{AuthProvider, BackendAuthProvider, Session};
pub use date_filter::{filter_logs, validate_range, DateRange};
pub use error::{ClientError, Result};
pub use models::{
    LoginRequest, LoginResponse, Notification, RequestLog, RequestReceipt, Sender, SenderRequest,
    UserAccount,
};
pub use poller::{
    acknowledge_ids, acknowledge_unread, poll_once, BellSnapshot, NotificationPoller,
    PollerConfig, PollerHandle,
};
pub use selection::{SelectionError, SelectionState, ALL_SENDER_FIELDS};
pub use status::{StatusSet, StatusStage};
