//! Integration tests for the backend client
//!
//! These run the real `ApiClient` against a wiremock stub of the backend and
//! verify the wire contract: auth headers, query building, error mapping,
//! download filename handling, and the bell acknowledge-then-refetch flow.

use serde_json::json;
use smsdesk_client::{
    poller, ApiClient, ClientError, DateRange, DownloadKind, NotificationPoller, PollerConfig,
    Session, StatusStage, UserAccount,
};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_session() -> Session {
    Session::new(
        "test-token",
        UserAccount {
            id: "64aa".into(),
            name: "Admin".into(),
            email: "admin@example.com".into(),
            role: Some("user".into()),
        },
    )
}

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri()).expect("client construction")
}

#[tokio::test]
async fn test_login_returns_session_material() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .and(body_json(json!({
            "email": "admin@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "64aa",
            "name": "Admin",
            "email": "admin@example.com",
            "role": "user",
            "token": "jwt-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client.login("admin@example.com", "secret").await.unwrap();
    assert_eq!(response.token, "jwt-token");
    assert_eq!(response.account.name, "Admin");
}

#[tokio::test]
async fn test_login_rejection_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.login("admin@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn test_available_senders_builds_range_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/available-senders"))
        .and(query_param("start", "2025-08-01"))
        .and(query_param("end", "2025-08-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "sender_name": "Sender 1",
            "mobile_provider": "AIS",
            "phone_number": "0811234567",
            "full_name": "Test Person",
            "date": "2025-08-05"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let range = DateRange::parse("2025-08-01", "2025-08-31").unwrap();
    let senders = client.available_senders(&range).await.unwrap();
    assert_eq!(senders.len(), 1);
    assert_eq!(senders[0].sender_name, "Sender 1");
}

#[tokio::test]
async fn test_request_logs_require_bearer_and_accept_both_status_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/requests"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "request_id": "req-new",
                "thai_date": "2025-08-10",
                "status": ["pending", "suspension_requested"],
                "reply_file_id": "",
                "pdf_sent_data_id": "f1",
                "pdf_sent_suspension_id": "f2",
                "is_read": false,
                "read_by": []
            },
            {
                "request_id": "req-legacy",
                "thai_date": "05 August 2025",
                "status": "received"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let logs = client.request_logs(&test_session()).await.unwrap();
    assert_eq!(logs.len(), 2);

    // Sparse set taken literally
    assert!(logs[0].status.contains(StatusStage::SuspensionRequested));
    assert!(!logs[0].status.contains(StatusStage::Received));
    assert!(logs[0].reply_file_id.is_none());

    // Legacy single string expanded to its monotonic prefix
    assert!(logs[1].status.contains(StatusStage::Pending));
    assert!(logs[1].status.contains(StatusStage::Received));
    assert!(!logs[1].status.contains(StatusStage::Suspended));
}

#[tokio::test]
async fn test_create_request_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Request submitted",
            "request_id": "req-123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = smsdesk_client::SenderRequest {
        fields: vec!["sender_name".into(), "phone_number".into()],
        rows: vec![smsdesk_client::Sender {
            sender_name: "Sender 1".into(),
            mobile_provider: "AIS".into(),
            phone_number: "0811234567".into(),
            full_name: "Test Person".into(),
            date: "2025-08-05".into(),
        }],
    };
    let receipt = client
        .create_request(&test_session(), &request)
        .await
        .unwrap();
    assert_eq!(receipt.request_id, "req-123");
}

#[tokio::test]
async fn test_backend_detail_surfaces_in_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/requests"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Malformed request window"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.request_logs(&test_session()).await.unwrap_err();
    match err {
        ClientError::Backend { status, detail } => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Malformed request window");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_collapse_acknowledges_each_unread_once_then_refetches() {
    let server = MockServer::start().await;

    // Feed: three notifications, two unread. The collapse must issue exactly
    // one mark-read per unread entry plus one refetch (two GETs in total:
    // the initial poll and the refetch).
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"notification_id": "n1", "request_id": "req-1", "status": "received",
             "thai_date": "2025-08-10", "is_read": false},
            {"notification_id": "n2", "request_id": "req-2", "status": "suspended",
             "thai_date": "2025-08-11", "is_read": true},
            {"notification_id": "n3", "request_id": "req-3", "status": "received",
             "thai_date": "2025-08-12", "is_read": false}
        ])))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/notification/mark-read/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Marked as read"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notification/mark-read/n3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Marked as read"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let session = test_session();

    let snapshot = poller::poll_once(&client, &session).await.unwrap();
    assert_eq!(snapshot.unread_count(), 2);

    let refreshed = poller::acknowledge_unread(&client, &session, &snapshot)
        .await
        .unwrap();
    assert_eq!(refreshed.notifications.len(), 3);
}

#[tokio::test]
async fn test_acknowledge_by_id_costs_one_mark_read_per_id_plus_one_fetch() {
    let server = MockServer::start().await;

    // Acknowledging known ids must not fetch the feed first: the only GET
    // allowed is the single refetch at the end.
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"notification_id": "n1", "request_id": "req-1", "status": "received",
             "thai_date": "2025-08-10", "is_read": true},
            {"notification_id": "n2", "request_id": "req-2", "status": "received",
             "thai_date": "2025-08-11", "is_read": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notification/mark-read/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Marked as read"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notification/mark-read/n2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Marked as read"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let ids = vec!["n1".to_string(), "n2".to_string()];
    let refreshed = poller::acknowledge_ids(&client, &test_session(), &ids)
        .await
        .unwrap();
    assert_eq!(refreshed.unread_count(), 0);
}

#[tokio::test]
async fn test_collapse_survives_partial_acknowledge_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"notification_id": "n1", "request_id": "req-1", "status": "received",
             "thai_date": "2025-08-10", "is_read": false},
            {"notification_id": "n2", "request_id": "req-2", "status": "received",
             "thai_date": "2025-08-11", "is_read": false}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notification/mark-read/n1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Notification not found"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notification/mark-read/n2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Marked as read"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let session = test_session();
    let snapshot = poller::poll_once(&client, &session).await.unwrap();

    // One acknowledgement fails; the collapse still completes and refetches.
    let refreshed = poller::acknowledge_unread(&client, &session, &snapshot).await;
    assert!(refreshed.is_ok());
}

#[tokio::test]
async fn test_download_uses_content_disposition_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/file/f1"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", r#"attachment; filename="report_req-1.pdf""#)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 fake".to_vec()),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let file = client
        .download_file(&test_session(), "f1", DownloadKind::Pdf)
        .await
        .unwrap();
    assert_eq!(file.filename, "report_req-1.pdf");
    assert_eq!(file.content_type, "application/pdf");
    assert!(file.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_download_falls_back_to_kind_based_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/file/f2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let session = test_session();

    let pdf = client
        .download_file(&session, "f2", DownloadKind::Pdf)
        .await
        .unwrap();
    assert_eq!(pdf.filename, "document_f2.pdf");

    let data = client
        .download_file(&session, "f2", DownloadKind::Data)
        .await
        .unwrap();
    assert_eq!(data.filename, "data_f2.xlsx");
}

#[tokio::test]
async fn test_failed_download_yields_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/file/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "File not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .download_file(&test_session(), "missing", DownloadKind::Data)
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Backend { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_poller_publishes_snapshots_and_stops_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"notification_id": "n1", "request_id": "req-1", "status": "received",
             "thai_date": "2025-08-10", "is_read": false}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let handle = NotificationPoller::spawn(
        client,
        test_session(),
        PollerConfig {
            interval: Duration::from_millis(20),
        },
    );

    let mut updates = handle.subscribe();
    updates.changed().await.expect("first snapshot");
    assert_eq!(handle.snapshot().unread_count(), 1);

    handle.stop().await;
}

#[tokio::test]
async fn test_poller_skips_ticks_while_a_fetch_is_in_flight() {
    let server = MockServer::start().await;
    // Each fetch takes 3 intervals to answer. A poller that stacked
    // requests would fire far more than the couple we allow here.
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(60))
                .set_body_json(json!([])),
        )
        .expect(1..=4)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let handle = NotificationPoller::spawn(
        client,
        test_session(),
        PollerConfig {
            interval: Duration::from_millis(20),
        },
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.stop().await;
}
