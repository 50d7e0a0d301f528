//! Error types shared by the façade and the worker.

use thiserror::Error;

/// Failure while computing the Cognito secret hash.
///
/// Both variants point at bad client configuration and are never retried.
#[derive(Debug, Error)]
pub enum SecretHashError {
    #[error("secret hash input `{0}` is empty")]
    EmptyInput(&'static str),

    #[error("failed to initialise HMAC key: {0}")]
    KeyInit(String),
}

/// Failure reported by the identity provider client.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider received the call and rejected it.
    #[error("identity provider rejected the request ({code}): {message}")]
    Provider { code: String, message: String },

    /// The call never completed: request construction, dispatch, timeout or
    /// an unreadable response.
    #[error("identity provider client error: {0}")]
    Client(String),

    #[error("unexpected identity provider error: {0}")]
    Unexpected(String),
}

impl IdentityError {
    /// Short label used as the `error_kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            IdentityError::Provider { .. } => "provider",
            IdentityError::Client(_) => "client",
            IdentityError::Unexpected(_) => "unexpected",
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            IdentityError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Failure talking to the message queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue receive failed: {0}")]
    Receive(String),

    #[error("queue delete failed: {0}")]
    Delete(String),

    #[error("queue send failed: {0}")]
    Send(String),

    #[error("failed to serialize queue message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure sending a notification email.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build email: {0}")]
    Build(String),

    #[error("email send failed: {0}")]
    Send(String),
}

/// A queued group-assignment message that can never be applied.
///
/// Every variant keeps the raw body so the dead-letter log line is enough to
/// diagnose the message without fetching it from the DLQ.
#[derive(Debug, Error)]
pub enum InvalidMessage {
    #[error("message body is not a valid group assignment payload: {source}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("message is missing required field(s): {missing}")]
    MissingFields { body: String, missing: String },

    #[error("unknown user group `{group}`")]
    UnknownGroup { body: String, group: String },
}

impl InvalidMessage {
    /// Short label used as the `reason` log field.
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidMessage::Parse { .. } => "parse_error",
            InvalidMessage::MissingFields { .. } => "missing_fields",
            InvalidMessage::UnknownGroup { .. } => "unknown_group",
        }
    }

    pub fn body(&self) -> &str {
        match self {
            InvalidMessage::Parse { body, .. }
            | InvalidMessage::MissingFields { body, .. }
            | InvalidMessage::UnknownGroup { body, .. } => body,
        }
    }
}

/// Failure loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Failure of an authentication façade operation.
///
/// Each variant maps to exactly one HTTP outcome in [`crate::web`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("request validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("failed to publish group assignment: {0}")]
    Publish(#[from] QueueError),

    #[error("secret hash configuration error: {0}")]
    Configuration(#[from] SecretHashError),
}
