//! Authgate - Cognito sign-up façade and group-assignment worker.
//!
//! This library provides shared modules for the two binaries:
//! - `authgate-web`: HTTP API for register, login and email confirmation
//! - `authgate-worker`: SQS consumer that assigns Cognito groups
//!
//! ## Architecture
//!
//! ```text
//! HTTP → Web Server → Cognito sign-up → group-assignment queue → Worker → Cognito group
//!                                                                    ↘ DLQ
//! ```

pub mod auth;
pub mod cognito;
pub mod config;
pub mod error;
pub mod notify;
pub mod queue;
pub mod util;
pub mod web;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use auth::AuthService;
pub use cognito::{calculate_secret_hash, CognitoClient, UserGroup};
pub use config::Config;
pub use error::{AuthError, ConfigError, IdentityError, InvalidMessage, QueueError};
pub use queue::{GroupAssignmentPublisher, SqsQueue};
pub use worker::{MessageProcessor, ProcessOutcome, QueuePoller};
