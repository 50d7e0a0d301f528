//! Publisher for group-assignment events.
//!
//! The web server publishes one event per successful registration; the
//! worker consumes them and applies the group.

use std::sync::Arc;

use tracing::{error, info};

use super::client::QueueClient;
use super::types::GroupAssignmentMessage;
use crate::cognito::UserGroup;
use crate::error::QueueError;

/// Publishes [`GroupAssignmentMessage`]s to the source queue.
#[derive(Clone)]
pub struct GroupAssignmentPublisher {
    queue: Arc<dyn QueueClient>,
    queue_url: String,
}

impl GroupAssignmentPublisher {
    pub fn new(queue: Arc<dyn QueueClient>, queue_url: String) -> Self {
        Self { queue, queue_url }
    }

    /// Publish a group assignment for a freshly registered user.
    pub async fn publish(&self, email: &str, group: UserGroup) -> Result<(), QueueError> {
        let body = serde_json::to_string(&GroupAssignmentMessage::new(email, group))?;

        info!(email = %email, group = %group, "sqs_send_start");

        if let Err(e) = self.queue.send(&self.queue_url, &body).await {
            error!(email = %email, group = %group, error = %e, "sqs_send_error");
            return Err(e);
        }

        info!(
            queue_url = %self.queue_url,
            email = %email,
            group = %group,
            body_length = body.len(),
            "sqs_send_success"
        );

        Ok(())
    }
}
