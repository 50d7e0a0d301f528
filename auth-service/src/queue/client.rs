//! Queue client backed by AWS SQS.

use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use tracing::warn;

use super::types::QueueMessage;
use crate::error::QueueError;

/// The three queue operations the service needs.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receive up to `max_messages`, waiting up to `wait_time_seconds` for the
    /// first one to arrive.
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError>;

    async fn send(&self, queue_url: &str, body: &str) -> Result<(), QueueError>;
}

/// [`QueueClient`] over an SQS client.
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
}

impl SqsQueue {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_time_seconds)
            .send()
            .await
            .map_err(|e| QueueError::Receive(DisplayErrorContext(&e).to_string()))?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| {
                // Without a receipt handle the message cannot be deleted;
                // leave it for redelivery
                let Some(receipt_handle) = message.receipt_handle else {
                    warn!(
                        message_id = message.message_id.as_deref().unwrap_or("unknown"),
                        "sqs_message_missing_receipt_handle"
                    );
                    return None;
                };

                Some(QueueMessage {
                    message_id: message.message_id,
                    body: message.body.unwrap_or_default(),
                    receipt_handle,
                })
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Delete(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<(), QueueError> {
        self.client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Send(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
