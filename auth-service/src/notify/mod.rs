//! User notifications.
//!
//! Notifications are best-effort: callers log failures and carry on.

pub mod ses;

use async_trait::async_trait;

use crate::cognito::UserGroup;
use crate::error::NotifyError;

pub use ses::SesNotifier;

/// Sends plain-text emails.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, recipient: &str, subject: &str, body: &str)
        -> Result<(), NotifyError>;
}

/// "Account ready" email sent once a user has been placed in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReadyEmail {
    pub subject: String,
    pub body: String,
}

impl AccountReadyEmail {
    pub fn new(email: &str, group: UserGroup) -> Self {
        Self {
            subject: "Your account is ready".to_string(),
            body: format!(
                "Hello {email}, your account has been created and added to the {group} group. \
                 You can now sign in."
            ),
        }
    }
}
