//! SQS polling loop with dead-lettering.
//!
//! Every tick receives one bounded batch and drives each message to exactly
//! one terminal path:
//!
//! ```text
//! RECEIVED → processed ───────────────────────→ DELETED
//!          → invalid / failed → sent to DLQ ──→ DELETED
//! ```
//!
//! Nothing is retried in place. A message that fails is forwarded to the
//! dead-letter queue and deleted, even if the forward itself fails.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::processor::{panic_message, MessageProcessor, ProcessOutcome, ProcessingFailure};
use crate::config::QueueSettings;
use crate::queue::{QueueClient, QueueMessage};

/// Counters for one polling tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub received: usize,
    pub processed: usize,
    pub dead_lettered: usize,
    /// The receive call failed; nothing was processed
    pub receive_failed: bool,
    /// Another tick was still running; nothing was done
    pub skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Processed,
    DeadLettered,
}

/// Periodically consumes the group-assignment queue.
pub struct QueuePoller {
    queue: Arc<dyn QueueClient>,
    processor: MessageProcessor,
    settings: QueueSettings,
    in_progress: AtomicBool,
}

/// Clears the in-progress flag when a tick ends, including on cancellation.
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl QueuePoller {
    pub fn new(
        queue: Arc<dyn QueueClient>,
        processor: MessageProcessor,
        settings: QueueSettings,
    ) -> Self {
        Self {
            queue,
            processor,
            settings,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Run ticks every `fixed_rate_ms` until `shutdown` resolves.
    ///
    /// A tick that has started always runs to completion before shutdown is
    /// observed. Ticks missed while a slow tick was running are skipped.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let period = Duration::from_millis(self.settings.fixed_rate_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);

        info!(
            queue_url = %self.settings.queue_url,
            dlq_url = %self.settings.dlq_url,
            fixed_rate_ms = self.settings.fixed_rate_ms,
            max_messages = self.settings.max_messages,
            wait_time_seconds = self.settings.wait_time_seconds,
            "worker_ready"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("worker_stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.consume_messages().await;
                }
            }
        }

        info!("worker_shutdown_complete");
    }

    /// Run one polling tick.
    ///
    /// Never fails: receive errors end the tick early and every per-message
    /// failure is handled by dead-lettering. Returns immediately if another
    /// tick is already in progress.
    pub async fn consume_messages(&self) -> TickSummary {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            warn!(queue_url = %self.settings.queue_url, "worker_sqs_tick_skipped");
            return TickSummary {
                skipped: true,
                ..Default::default()
            };
        }
        let _guard = TickGuard(&self.in_progress);

        info!(queue_url = %self.settings.queue_url, "worker_sqs_checking");

        let messages = match self
            .queue
            .receive(
                &self.settings.queue_url,
                self.settings.max_messages,
                self.settings.wait_time_seconds,
            )
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                error!(
                    queue_url = %self.settings.queue_url,
                    error = %e,
                    "worker_sqs_error_consuming"
                );
                return TickSummary {
                    receive_failed: true,
                    ..Default::default()
                };
            }
        };

        debug!(count = messages.len(), "worker_sqs_retrieved");

        let mut summary = TickSummary {
            received: messages.len(),
            ..Default::default()
        };

        for message in messages {
            match self.handle_message(message).await {
                Disposition::Processed => summary.processed += 1,
                Disposition::DeadLettered => summary.dead_lettered += 1,
            }
        }

        if summary.received > 0 {
            info!(
                received = summary.received,
                processed = summary.processed,
                dead_lettered = summary.dead_lettered,
                "worker_sqs_tick_complete"
            );
        }

        summary
    }

    /// Drive one message to a terminal state and delete it.
    async fn handle_message(&self, message: QueueMessage) -> Disposition {
        let message_id = message.message_id.as_deref().unwrap_or("unknown");

        info!(
            message_id = %message_id,
            body_length = message.body.len(),
            "worker_sqs_received"
        );

        // A panic in a collaborator must not take down the rest of the batch
        let outcome = AssertUnwindSafe(self.processor.process(&message.body))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                ProcessOutcome::UnexpectedFailure(ProcessingFailure::Panicked(panic_message(
                    panic.as_ref(),
                )))
            });

        let disposition = match outcome {
            ProcessOutcome::Success(_) => Disposition::Processed,
            ProcessOutcome::InvalidMessage(invalid) => {
                error!(
                    message_id = %message_id,
                    reason = invalid.reason(),
                    error = %invalid,
                    body = %invalid.body(),
                    "worker_sqs_invalid_message"
                );
                self.send_to_dlq(message_id, &message.body).await;
                Disposition::DeadLettered
            }
            ProcessOutcome::UnexpectedFailure(failure) => {
                error!(
                    message_id = %message_id,
                    error_kind = failure.kind(),
                    error_code = failure.code().unwrap_or("n/a"),
                    error = %failure,
                    body = %message.body,
                    "worker_sqs_error_processing"
                );
                self.send_to_dlq(message_id, &message.body).await;
                Disposition::DeadLettered
            }
        };

        self.delete_message(message_id, &message.receipt_handle).await;

        disposition
    }

    /// Forward a raw body to the dead-letter queue. Failures are logged only.
    async fn send_to_dlq(&self, message_id: &str, body: &str) {
        match self.queue.send(&self.settings.dlq_url, body).await {
            Ok(()) => warn!(
                message_id = %message_id,
                dlq_url = %self.settings.dlq_url,
                body = %body,
                "worker_sqs_sent_dlq"
            ),
            Err(e) => error!(
                message_id = %message_id,
                dlq_url = %self.settings.dlq_url,
                body = %body,
                error = %e,
                "worker_sqs_error_dlq"
            ),
        }
    }

    /// Delete a message from the source queue.
    ///
    /// A failed delete is not fatal: the message reappears after its
    /// visibility timeout and reprocessing is idempotent.
    async fn delete_message(&self, message_id: &str, receipt_handle: &str) {
        match self
            .queue
            .delete(&self.settings.queue_url, receipt_handle)
            .await
        {
            Ok(()) => debug!(message_id = %message_id, "worker_sqs_deleted"),
            Err(e) => error!(
                message_id = %message_id,
                error = %e,
                "worker_sqs_error_deleting"
            ),
        }
    }
}
