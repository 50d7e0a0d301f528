//! Queue module for SQS operations.
//!
//! This module provides:
//! - Message types for the group-assignment queue
//! - The `QueueClient` trait and its SQS implementation
//! - A publisher for registration events
//!
//! ## Architecture
//!
//! ```text
//! Web Server → group-assignment queue → Worker → Cognito group + SES email
//!                                          ↘ dead-letter queue (on failure)
//! ```

pub mod client;
pub mod publisher;
pub mod types;

pub use client::{QueueClient, SqsQueue};
pub use publisher::GroupAssignmentPublisher;
pub use types::{GroupAssignmentMessage, QueueMessage};
