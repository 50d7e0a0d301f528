//! Queue message types.

use serde::{Deserialize, Serialize};

use crate::cognito::UserGroup;

/// A message received from a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Queue-assigned identifier, used for logging only
    pub message_id: Option<String>,
    /// Raw message body
    pub body: String,
    /// Handle for deleting this delivery; valid for one delivery only
    pub receipt_handle: String,
}

/// Group-assignment event published after a successful registration.
///
/// Both fields are optional on the wire so that a message with a missing or
/// `null` field still parses and can be reported as such.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignmentMessage {
    pub email: Option<String>,
    pub group: Option<String>,
}

impl GroupAssignmentMessage {
    pub fn new(email: impl Into<String>, group: UserGroup) -> Self {
        Self {
            email: Some(email.into()),
            group: Some(group.group_name().to_string()),
        }
    }
}
