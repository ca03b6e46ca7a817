use anyhow::Result;
use httpmock::prelude::*;
use retreat_notify::domain::model::DeliveryOutcome;
use retreat_notify::{
    DeviceTarget, FcmTransport, NotificationDispatcher, Platform, PushMessage, TomlConfig,
};
use std::io::Write;
use tempfile::NamedTempFile;

const SEND_PATH: &str = "/v1/projects/retreat-app/messages:send";

fn config_for(server: &MockServer) -> Result<TomlConfig> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[fcm]
project_id = "retreat-app"
endpoint = "{}"
access_token = "ya29.integration"
timeout_seconds = 5

[dispatch]
concurrent_requests = 2
max_attempts = 3
base_delay_ms = 1
max_delay_ms = 5
"#,
        server.base_url()
    )?;
    Ok(TomlConfig::from_file(file.path())?)
}

fn dispatcher(config: &TomlConfig) -> Result<NotificationDispatcher<FcmTransport>> {
    let transport = FcmTransport::new(config)?;
    Ok(NotificationDispatcher::from_config(transport, config).with_retry(config.retry_policy()))
}

/// 每個平台收到對應政策的 payload
#[tokio::test]
async fn test_dispatch_applies_platform_policies() -> Result<()> {
    let server = MockServer::start();

    let android_mock = server.mock(|when, then| {
        when.method(POST)
            .path(SEND_PATH)
            .header("Authorization", "Bearer ya29.integration")
            .json_body_partial(
                r#"{"message": {"token": "android-1", "android": {"priority": "high"},
                    "data": {"title": "Retreat approved", "body": "Welcome aboard"}}}"#,
            );
        then.status(200)
            .json_body(serde_json::json!({"name": "projects/retreat-app/messages/a1"}));
    });

    let ios_mock = server.mock(|when, then| {
        when.method(POST).path(SEND_PATH).json_body_partial(
            r#"{"message": {"token": "ios-1", "apns": {
                "headers": {"apns-push-type": "alert", "apns-priority": "10"},
                "payload": {"aps": {"mutable-content": 1}}}}}"#,
        );
        then.status(200)
            .json_body(serde_json::json!({"name": "projects/retreat-app/messages/i1"}));
    });

    let config = config_for(&server)?;
    let targets = vec![
        DeviceTarget::new("android-1", Platform::Android),
        DeviceTarget::new("ios-1", Platform::Ios),
    ];
    let message = PushMessage::new("Retreat approved", "Welcome aboard").with_category("application");

    let summary = dispatcher(&config)?.dispatch(&targets, &message).await;

    android_mock.assert();
    ios_mock.assert();
    assert_eq!(summary.delivered(), 2);
    assert_eq!(
        summary.reports[1].outcome,
        DeliveryOutcome::Delivered {
            message_id: "projects/retreat-app/messages/i1".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_dispatch_reports_stale_tokens() -> Result<()> {
    let server = MockServer::start();

    let gone_mock = server.mock(|when, then| {
        when.method(POST)
            .path(SEND_PATH)
            .json_body_partial(r#"{"message": {"token": "gone"}}"#);
        then.status(404).json_body(serde_json::json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "UNREGISTERED"
                }]
            }
        }));
    });

    let ok_mock = server.mock(|when, then| {
        when.method(POST)
            .path(SEND_PATH)
            .json_body_partial(r#"{"message": {"token": "alive"}}"#);
        then.status(200)
            .json_body(serde_json::json!({"name": "projects/retreat-app/messages/ok"}));
    });

    let config = config_for(&server)?;
    let targets = vec![
        DeviceTarget::new("gone", Platform::Android),
        DeviceTarget::new("alive", Platform::Web),
    ];

    let summary = dispatcher(&config)?
        .dispatch(&targets, &PushMessage::new("Chat", "New message"))
        .await;

    gone_mock.assert_hits(1);
    ok_mock.assert();
    assert_eq!(summary.stale_tokens(), vec!["gone"]);
    assert_eq!(summary.delivered(), 1);
    Ok(())
}

#[tokio::test]
async fn test_dispatch_retries_server_errors_until_exhausted() -> Result<()> {
    let server = MockServer::start();

    let failing_mock = server.mock(|when, then| {
        when.method(POST).path(SEND_PATH);
        then.status(503).body("backend unavailable");
    });

    let config = config_for(&server)?;
    let summary = dispatcher(&config)?
        .dispatch(
            &[DeviceTarget::new("ios-2", Platform::Ios)],
            &PushMessage::new("Lecture", "Starts soon"),
        )
        .await;

    failing_mock.assert_hits(3);
    let report = &summary.reports[0];
    assert_eq!(report.attempts, 3);
    assert!(matches!(
        report.outcome,
        DeliveryOutcome::Failed { retryable: true, .. }
    ));
    Ok(())
}

/// 專案 id 錯誤時的 404 不能把所有裝置當成失效 token
#[tokio::test]
async fn test_wrong_project_404_keeps_tokens() -> Result<()> {
    let server = MockServer::start();

    let not_found_mock = server.mock(|when, then| {
        when.method(POST).path(SEND_PATH);
        then.status(404).json_body(serde_json::json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND"
            }
        }));
    });

    let config = config_for(&server)?;
    let targets = vec![
        DeviceTarget::new("android-9", Platform::Android),
        DeviceTarget::new("ios-9", Platform::Ios),
    ];

    let summary = dispatcher(&config)?
        .dispatch(&targets, &PushMessage::new("Retreat", "Schedule posted"))
        .await;

    not_found_mock.assert_hits(2);
    assert!(summary.stale_tokens().is_empty());
    assert_eq!(summary.delivered(), 0);
    assert!(summary
        .reports
        .iter()
        .all(|r| matches!(r.outcome, DeliveryOutcome::Failed { retryable: false, .. }) && r.attempts == 1));
    Ok(())
}
