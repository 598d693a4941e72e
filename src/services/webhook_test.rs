use super::*;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use tokio::sync::mpsc;

fn notice() -> AssessmentNotice {
    AssessmentNotice {
        assessment_id: Uuid::nil(),
        title: "Acme Corp".into(),
        session_id: "Ab3dEf7hIj".into(),
        browser_id: None,
        documents: vec!["sustainability_report.pdf".into()],
    }
}

/// Spawn a local endpoint that forwards every JSON body it receives.
async fn spawn_receiver(status: StatusCode) -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route(
            "/hook",
            post(
                move |State(tx): State<mpsc::UnboundedSender<serde_json::Value>>,
                      axum::Json(body): axum::Json<serde_json::Value>| async move {
                    let _ = tx.send(body);
                    status
                },
            ),
        )
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/hook"), rx)
}

#[test]
fn notice_serializes_without_browser_id() {
    let json = serde_json::to_value(notice()).unwrap();
    assert_eq!(json["session_id"], "Ab3dEf7hIj");
    assert_eq!(json["documents"][0], "sustainability_report.pdf");
    assert!(json.get("browser_id").is_none());
}

#[tokio::test]
async fn notify_disabled_without_urls() {
    let notifier = WebhookNotifier::new(Vec::new(), Duration::from_secs(1)).unwrap();
    assert!(!notifier.is_enabled());
    assert!(notifier.notify(notice()).is_none());
}

#[tokio::test]
async fn notify_posts_to_every_endpoint() {
    let (url_a, mut rx_a) = spawn_receiver(StatusCode::OK).await;
    let (url_b, mut rx_b) = spawn_receiver(StatusCode::OK).await;
    let notifier = WebhookNotifier::new(vec![url_a, url_b], Duration::from_secs(5)).unwrap();
    assert_eq!(notifier.endpoint_count(), 2);

    notifier.notify(notice()).expect("notifier enabled").await.unwrap();

    let body_a = rx_a.recv().await.unwrap();
    let body_b = rx_b.recv().await.unwrap();
    assert_eq!(body_a["title"], "Acme Corp");
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn notify_tolerates_failing_endpoints() {
    let (url_ok, mut rx_ok) = spawn_receiver(StatusCode::OK).await;
    let (url_err, _rx_err) = spawn_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
    let unreachable = "http://127.0.0.1:9/hook".to_string();
    let notifier = WebhookNotifier::new(vec![url_err, unreachable, url_ok], Duration::from_secs(5)).unwrap();

    notifier.notify(notice()).expect("notifier enabled").await.unwrap();

    assert_eq!(rx_ok.recv().await.unwrap()["session_id"], "Ab3dEf7hIj");
}

#[tokio::test]
async fn deliver_reports_non_success_status() {
    let (url, _rx) = spawn_receiver(StatusCode::BAD_GATEWAY).await;
    let http = reqwest::Client::new();
    let err = deliver(&http, &url, &notice()).await.unwrap_err();
    assert!(matches!(err, WebhookError::Status { status: 502 }));
}
