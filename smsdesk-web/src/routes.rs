//! HTTP routes for the dashboard
//!
//! Page handlers render HTML from [`crate::templates`]; the two `/api/bell`
//! endpoints speak JSON to the in-page bell script. Authentication is a
//! signed session cookie resolved against the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use smsdesk_client::{
    acknowledge_ids, filter_logs, poll_once, validate_range, ApiClient, AuthProvider,
    ClientError, DateRange, DownloadKind, SelectionError, SelectionState, Sender, Session,
    ALL_SENDER_FIELDS,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::session::{SessionStore, SESSION_COOKIE};
use crate::templates;

/// Shared handler state
pub struct AppState {
    pub client: ApiClient,
    pub sessions: SessionStore,
    pub auth: Arc<dyn AuthProvider>,
    pub poll_interval_secs: u64,
}

impl AppState {
    pub fn new(config: &Config, client: ApiClient, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client,
            sessions: SessionStore::new(&config.session),
            auth,
            poll_interval_secs: config.server.poll_interval_secs,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", get(logout))
        .route("/", get(dashboard))
        .route("/submit", post(submit_request))
        .route("/history", get(history))
        .route("/download/{file_id}", get(download))
        .route("/api/bell", get(bell_snapshot))
        .route("/api/bell/read", post(bell_collapse))
        .with_state(state)
}

/// Pull the session out of the `Cookie` header, if any
fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(&format!("{SESSION_COOKIE}=")))
        .and_then(|value| state.sessions.resolve(value))
}

fn cookie_value(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
}

fn today_string() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Render a backend failure for a page context
///
/// An expired or rejected token sends the user back to the login form;
/// anything else gets the standalone error page.
fn page_error(state: &AppState, session: Option<&Session>, err: ClientError) -> Response {
    match err {
        ClientError::AuthenticationFailed(_) | ClientError::SessionExpired => {
            Redirect::to("/login").into_response()
        }
        ClientError::Backend { status: 401, .. } => Redirect::to("/login").into_response(),
        other => {
            warn!(error = %other, "request against backend failed");
            let status = if matches!(other, ClientError::Validation(_)) {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            let body = templates::error_page(
                session.map(|s| s.account()),
                &other.user_message(),
                state.poll_interval_secs,
            );
            (status, Html(body)).into_response()
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RangeQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
}

async fn login_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if resolve_session(&state, &headers).is_some() {
        return Redirect::to("/").into_response();
    }
    Html(templates::login_page(None)).into_response()
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(&form.email, &form.password).await {
        Ok(session) => {
            info!(email = %session.account().email, "user logged in");
            let value = state.sessions.issue(session);
            let cookie = format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax");
            let mut response = Redirect::to("/").into_response();
            if let Ok(header) = cookie.parse() {
                response.headers_mut().insert(SET_COOKIE, header);
            }
            response
        }
        Err(ClientError::AuthenticationFailed(_)) => {
            let body = templates::login_page(Some("Incorrect email or password."));
            (StatusCode::UNAUTHORIZED, Html(body)).into_response()
        }
        Err(err) => {
            warn!(error = %err, "login against backend failed");
            let body = templates::login_page(Some(&err.user_message()));
            (StatusCode::BAD_GATEWAY, Html(body)).into_response()
        }
    }
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(value) = cookie_value(&headers) {
        state.sessions.revoke(&value);
    }
    let clear = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    let mut response = Redirect::to("/login").into_response();
    if let Ok(header) = clear.parse() {
        response.headers_mut().insert(SET_COOKIE, header);
    }
    response
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Response {
    let Some(session) = resolve_session(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let today = Local::now().date_naive();
    let today_str = today_string();

    let render_error = |message: &str| {
        Html(templates::dashboard_page(
            session.account(),
            &[],
            &SelectionState::new(0),
            &query.start,
            &query.end,
            &today_str,
            Some(message),
            None,
            state.poll_interval_secs,
        ))
        .into_response()
    };

    let range = match DateRange::parse(&query.start, &query.end) {
        Ok(range) => range,
        Err(err) => return render_error(&err.user_message()),
    };
    if let Err(err) = validate_range(&range, today) {
        return render_error(&err.user_message());
    }

    match state.client.available_senders(&range).await {
        Ok(senders) => {
            let selection = SelectionState::new(senders.len());
            Html(templates::dashboard_page(
                session.account(),
                &senders,
                &selection,
                &query.start,
                &query.end,
                &today_str,
                None,
                None,
                state.poll_interval_secs,
            ))
            .into_response()
        }
        Err(err) => page_error(&state, Some(&session), err),
    }
}

/// Deselect every field the form did not tick
fn apply_form_fields(selection: &mut SelectionState, form: &HashMap<String, String>) {
    for field in ALL_SENDER_FIELDS {
        if !form.contains_key(&format!("field_{field}")) {
            selection.toggle_field(field);
        }
    }
}

/// Rebuild the selection from checkbox names and submit it
///
/// Field checkboxes arrive as `field_<name>=on` and row checkboxes as
/// `row_<index>=on` against the sender list for the submitted range. An
/// empty selection is rejected up front, before any backend call; otherwise
/// the range is re-fetched so a stale index cannot select the wrong row.
async fn submit_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let Some(session) = resolve_session(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let start = form.get("start").cloned().unwrap_or_default();
    let end = form.get("end").cloned().unwrap_or_default();
    let today_str = today_string();

    let has_rows = form.keys().any(|k| k.starts_with("row_"));
    let has_fields = form.keys().any(|k| k.starts_with("field_"));
    if !has_rows || !has_fields {
        let err = if !has_rows {
            SelectionError::NoRowsSelected
        } else {
            SelectionError::NoFieldsSelected
        };
        let mut selection = SelectionState::new(0);
        apply_form_fields(&mut selection, &form);
        return Html(templates::dashboard_page(
            session.account(),
            &[],
            &selection,
            &start,
            &end,
            &today_str,
            Some(&ClientError::from(err).user_message()),
            None,
            state.poll_interval_secs,
        ))
        .into_response();
    }

    let range = match DateRange::parse(&start, &end) {
        Ok(range) => range,
        Err(err) => return page_error(&state, Some(&session), err),
    };
    let senders: Vec<Sender> = match state.client.available_senders(&range).await {
        Ok(senders) => senders,
        Err(err) => return page_error(&state, Some(&session), err),
    };

    let render_selection_error = |selection: &SelectionState, message: &str| {
        Html(templates::dashboard_page(
            session.account(),
            &senders,
            selection,
            &start,
            &end,
            &today_str,
            Some(message),
            None,
            state.poll_interval_secs,
        ))
        .into_response()
    };

    let mut selection = SelectionState::new(senders.len());
    apply_form_fields(&mut selection, &form);
    for key in form.keys() {
        if let Some(index) = key.strip_prefix("row_") {
            let Ok(index) = index.parse::<usize>() else {
                return render_selection_error(&selection, "Invalid row selection.");
            };
            if selection.toggle_row(index).is_err() {
                return render_selection_error(
                    &selection,
                    "The sender list changed; please review your selection and try again.",
                );
            }
        }
    }

    let request = match selection.build_request(&senders) {
        Ok(request) => request,
        Err(err) => {
            let message = ClientError::from(err).user_message();
            return render_selection_error(&selection, &message);
        }
    };

    match state.client.create_request(&session, &request).await {
        Ok(receipt) => {
            info!(request_id = %receipt.request_id, "request submitted");
            Html(templates::submitted_page(
                session.account(),
                &receipt.request_id,
                state.poll_interval_secs,
            ))
            .into_response()
        }
        Err(err) => page_error(&state, Some(&session), err),
    }
}

async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Response {
    let Some(session) = resolve_session(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let today_str = today_string();

    let range = match DateRange::parse(&query.start, &query.end) {
        Ok(range) => range,
        Err(err) => {
            let body = templates::history_page(
                session.account(),
                &[],
                &query.start,
                &query.end,
                &today_str,
                Some(&err.user_message()),
                state.poll_interval_secs,
            );
            return Html(body).into_response();
        }
    };

    match state.client.request_logs(&session).await {
        Ok(logs) => {
            let logs = filter_logs(&logs, &range);
            Html(templates::history_page(
                session.account(),
                &logs,
                &query.start,
                &query.end,
                &today_str,
                None,
                state.poll_interval_secs,
            ))
            .into_response()
        }
        Err(err) => page_error(&state, Some(&session), err),
    }
}

#[derive(Debug, Deserialize, Default)]
struct DownloadQuery {
    #[serde(default)]
    kind: String,
}

async fn download(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(file_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(session) = resolve_session(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let kind = if query.kind == "data" {
        DownloadKind::Data
    } else {
        DownloadKind::Pdf
    };

    match state.client.download_file(&session, &file_id, kind).await {
        Ok(file) => {
            let mut response = file.bytes.into_response();
            let disposition = format!("attachment; filename=\"{}\"", file.filename);
            if let Ok(value) = file.content_type.parse() {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            if let Ok(value) = disposition.parse() {
                response.headers_mut().insert(CONTENT_DISPOSITION, value);
            }
            response
        }
        Err(err) => page_error(&state, Some(&session), err),
    }
}

fn bell_json(snapshot: &smsdesk_client::BellSnapshot) -> Json<serde_json::Value> {
    Json(json!({
        "unread_count": snapshot.unread_count(),
        "notifications": snapshot.notifications,
    }))
}

async fn bell_snapshot(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session) = resolve_session(&state, &headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match poll_once(&state.client, &session).await {
        Ok(snapshot) => bell_json(&snapshot).into_response(),
        Err(err) => {
            warn!(error = %err, "notification fetch failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BellReadRequest {
    /// Notification ids the page was displaying as unread
    #[serde(default)]
    ids: Vec<String>,
}

/// Panel collapse: mark the displayed unread entries as read, answer with
/// the refetched snapshot
///
/// The page sends the ids it was showing, so the collapse costs exactly one
/// mark-read per id plus a single refetch. A missing body just refetches.
async fn bell_collapse(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<BellReadRequest>>,
) -> Response {
    let Some(session) = resolve_session(&state, &headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let ids = body.map(|Json(request)| request.ids).unwrap_or_default();
    match acknowledge_ids(&state.client, &session, &ids).await {
        Ok(refreshed) => bell_json(&refreshed).into_response(),
        Err(err) => {
            warn!(error = %err, "acknowledge refetch failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}
