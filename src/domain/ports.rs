use crate::core::message::FcmRequest;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Delivers a single prepared FCM request and returns the message id.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, request: &FcmRequest) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn fcm_endpoint(&self) -> &str;
    fn project_id(&self) -> &str;
    fn access_token(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn concurrent_requests(&self) -> usize;
}
