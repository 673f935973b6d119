//! Background delivery queue for verification messages
//!
//! `JobQueueNotifier` implements `NotificationSink` by pushing jobs onto a bounded
//! Tokio channel. One worker task drains the channel and delivers each job through
//! the configured transports, retrying failures with exponential backoff.
//! Enqueueing never waits: when the queue is full the message is dropped and
//! logged, and the customer can ask for a resend.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use ident_core::services::{EmailMessage, NotificationSink, SmsMessage};

use super::transport::{EmailTransport, SmsTransport};

/// One unit of outbound work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryJob {
    Email(EmailMessage),
    Sms(SmsMessage),
}

impl DeliveryJob {
    fn kind(&self) -> &'static str {
        match self {
            DeliveryJob::Email(_) => "email",
            DeliveryJob::Sms(_) => "sms",
        }
    }
}

/// Retry schedule for a failing delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Wait before attempt `attempt + 1`, doubling from `base_delay_ms`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }
}

/// Queue settings
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

/// `NotificationSink` that hands messages to a background worker
#[derive(Clone)]
pub struct JobQueueNotifier {
    sender: mpsc::Sender<DeliveryJob>,
}

impl JobQueueNotifier {
    /// Start the worker and return the notifier feeding it
    ///
    /// The worker stops once every clone of the notifier has been dropped and the
    /// queue is drained; await the handle to flush pending deliveries on shutdown.
    pub fn spawn(
        email: Arc<dyn EmailTransport>,
        sms: Arc<dyn SmsTransport>,
        config: QueueConfig,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let worker = DeliveryWorker {
            email,
            sms,
            retry: config.retry,
        };
        let handle = tokio::spawn(worker.run(receiver));
        (Self { sender }, handle)
    }

    fn enqueue(&self, job: DeliveryJob) {
        let kind = job.kind();
        match self.sender.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(event = "notification_dropped", kind, reason = "queue_full", "Delivery queue is full");
            }
            Err(TrySendError::Closed(_)) => {
                error!(event = "notification_dropped", kind, reason = "worker_stopped", "Delivery worker has stopped");
            }
        }
    }
}

#[async_trait]
impl NotificationSink for JobQueueNotifier {
    async fn send_email(&self, message: EmailMessage) {
        self.enqueue(DeliveryJob::Email(message));
    }

    async fn send_sms(&self, message: SmsMessage) {
        self.enqueue(DeliveryJob::Sms(message));
    }
}

struct DeliveryWorker {
    email: Arc<dyn EmailTransport>,
    sms: Arc<dyn SmsTransport>,
    retry: RetryPolicy,
}

impl DeliveryWorker {
    async fn run(self, mut receiver: mpsc::Receiver<DeliveryJob>) {
        info!(event = "delivery_worker_started", "Delivery worker started");
        while let Some(job) = receiver.recv().await {
            self.deliver_with_retry(&job).await;
        }
        info!(event = "delivery_worker_stopped", "Delivery worker stopped (channel closed)");
    }

    async fn deliver(&self, job: &DeliveryJob) -> anyhow::Result<()> {
        match job {
            DeliveryJob::Email(message) => self.email.deliver_email(message).await,
            DeliveryJob::Sms(message) => self.sms.deliver_sms(message).await,
        }
    }

    async fn deliver_with_retry(&self, job: &DeliveryJob) {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.deliver(job).await {
                Ok(()) => return,
                Err(e) if attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        event = "delivery_retry",
                        kind = job.kind(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        event = "delivery_failed",
                        kind = job.kind(),
                        attempts = attempt,
                        error = %e,
                        "Giving up on delivery"
                    );
                    return;
                }
            }
        }
    }
}
