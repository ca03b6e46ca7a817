use crate::core::message::FcmRequest;
use crate::domain::ports::{ConfigProvider, PushTransport};
use crate::utils::error::{NotifyError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

impl ErrorBody {
    fn error_code(&self) -> Option<&str> {
        self.details.iter().find_map(|d| d.error_code.as_deref())
    }
}

/// Sends messages through the FCM HTTP v1 API.
pub struct FcmTransport {
    client: Client,
    send_url: String,
    access_token: Option<String>,
}

impl FcmTransport {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            config.fcm_endpoint().trim_end_matches('/'),
            config.project_id()
        );

        Ok(Self {
            client,
            send_url,
            access_token: config.access_token().map(str::to_string),
        })
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }
}

#[async_trait]
impl PushTransport for FcmTransport {
    async fn send(&self, request: &FcmRequest) -> Result<String> {
        tracing::debug!("Sending push to {}", self.send_url);

        let mut builder = self.client.post(&self.send_url).json(request);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let body: SendResponse = response.json().await?;
            return Ok(body.name);
        }

        let wait = retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        Err(classify_failure(status, wait, &text))
    }
}

/// Only the delta-seconds form of `Retry-After` is honoured.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn classify_failure(status: StatusCode, retry_after: Option<Duration>, body: &str) -> NotifyError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error;

    // A bare 404 comes from a wrong endpoint or project id, not from a dead device.
    let unregistered = error.error_code() == Some("UNREGISTERED")
        || (error.status == "INVALID_ARGUMENT"
            && error.message.to_ascii_lowercase().contains("registration token"));
    if unregistered {
        return NotifyError::InvalidToken;
    }

    let message = if error.message.is_empty() {
        body.chars().take(200).collect()
    } else {
        error.message
    };

    NotifyError::PushRejected {
        status: status.as_u16(),
        message,
        retryable: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
        retry_after,
    }
}
