use crate::core::message::{build_message, FcmRequest};
use crate::domain::model::{DeliveryOutcome, DeliveryReport, DeviceTarget, DispatchSummary, PushMessage};
use crate::domain::ports::{ConfigProvider, PushTransport};
use crate::utils::error::NotifyError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Exponential backoff for retryable send failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Sends one message to many devices with bounded concurrency.
pub struct NotificationDispatcher<T: PushTransport> {
    transport: Arc<T>,
    concurrent_requests: usize,
    retry: RetryPolicy,
}

impl<T: PushTransport + 'static> NotificationDispatcher<T> {
    pub fn new(transport: T, concurrent_requests: usize) -> Self {
        Self {
            transport: Arc::new(transport),
            concurrent_requests: concurrent_requests.max(1),
            retry: RetryPolicy::default(),
        }
    }

    /// Takes the in-flight limit from `config`.
    pub fn from_config<C: ConfigProvider>(transport: T, config: &C) -> Self {
        Self::new(transport, config.concurrent_requests())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn dispatch(&self, targets: &[DeviceTarget], message: &PushMessage) -> DispatchSummary {
        if targets.is_empty() {
            tracing::debug!("No device targets, nothing to send");
            return DispatchSummary::default();
        }

        tracing::info!(
            "📨 Dispatching '{}' to {} device(s), {} in flight",
            message.title,
            targets.len(),
            self.concurrent_requests
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrent_requests));
        let mut tasks = JoinSet::new();

        for (index, target) in targets.iter().cloned().enumerate() {
            let request = build_message(&target, message);
            let transport = Arc::clone(&self.transport);
            let semaphore = Arc::clone(&semaphore);
            let retry = self.retry.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let (outcome, attempts) = deliver(transport.as_ref(), &request, &retry).await;
                log_outcome(&target, &outcome, attempts);
                (
                    index,
                    DeliveryReport {
                        target,
                        outcome,
                        attempts,
                    },
                )
            });
        }

        let mut slots: Vec<Option<DeliveryReport>> = vec![None; targets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => tracing::error!("❌ Delivery task aborted: {}", e),
            }
        }

        let reports = slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| DeliveryReport {
                    target: target.clone(),
                    outcome: DeliveryOutcome::Failed {
                        reason: "delivery task aborted".to_string(),
                        retryable: true,
                    },
                    attempts: 0,
                })
            })
            .collect();

        let summary = DispatchSummary { reports };
        tracing::info!(
            "✅ Dispatch finished: {} delivered, {} failed, {} stale token(s)",
            summary.delivered(),
            summary.failed(),
            summary.stale_tokens().len()
        );
        summary
    }
}

async fn deliver<T: PushTransport + ?Sized>(
    transport: &T,
    request: &FcmRequest,
    retry: &RetryPolicy,
) -> (DeliveryOutcome, u32) {
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match transport.send(request).await {
            Ok(message_id) => return (DeliveryOutcome::Delivered { message_id }, attempt),
            Err(NotifyError::InvalidToken) => return (DeliveryOutcome::InvalidToken, attempt),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = retry
                    .delay_after(attempt)
                    .max(e.retry_after().unwrap_or_default());
                tracing::warn!(
                    "⚠️ Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return (
                    DeliveryOutcome::Failed {
                        reason: e.to_string(),
                        retryable: e.is_retryable(),
                    },
                    attempt,
                )
            }
        }
    }
}

fn log_outcome(target: &DeviceTarget, outcome: &DeliveryOutcome, attempts: u32) {
    match outcome {
        DeliveryOutcome::Delivered { message_id } => {
            tracing::debug!("{} device delivered as {} ({} attempt(s))", target.platform, message_id, attempts)
        }
        DeliveryOutcome::InvalidToken => {
            tracing::warn!("🗑️ {} device token is unregistered", target.platform)
        }
        DeliveryOutcome::Failed { reason, .. } => {
            tracing::error!("❌ {} device failed after {} attempt(s): {}", target.platform, attempts, reason)
        }
    }
}
