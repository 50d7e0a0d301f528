//! In-memory collaborators for unit tests.
//!
//! Each fake records every call so tests can assert on exactly what was
//! sent, deleted or assigned.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::cognito::{AuthTokens, GroupAssigner, IdentityProvider, SignUp, UserGroup};
use crate::config::{CognitoSettings, QueueSettings};
use crate::error::{IdentityError, NotifyError, QueueError};
use crate::notify::Notifier;
use crate::queue::{QueueClient, QueueMessage};

pub fn queue_settings() -> QueueSettings {
    QueueSettings {
        queue_url: "queue-url".to_string(),
        dlq_url: "dlq-url".to_string(),
        fixed_rate_ms: 1000,
        max_messages: 10,
        wait_time_seconds: 20,
    }
}

pub fn cognito_settings() -> CognitoSettings {
    CognitoSettings {
        user_pool_id: "us-east-1_pool".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

fn provider_error() -> IdentityError {
    IdentityError::Provider {
        code: "UserNotFoundException".to_string(),
        message: "User does not exist.".to_string(),
    }
}

/// One call made against a [`FakeQueue`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOp {
    /// (queue_url, body)
    Send(String, String),
    /// (queue_url, receipt_handle)
    Delete(String, String),
}

#[derive(Default)]
pub struct FakeQueue {
    pub incoming: Mutex<Vec<QueueMessage>>,
    pub fail_receive: bool,
    pub fail_send: bool,
    pub fail_delete: bool,
    /// When set, `receive` waits for a notification before returning
    pub receive_gate: Option<Arc<Notify>>,
    pub receives: Mutex<Vec<(String, i32, i32)>>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
    pub ops: Mutex<Vec<QueueOp>>,
}

impl FakeQueue {
    /// Queue holding one message per body, with receipt handles `rh-0`, `rh-1`, ...
    pub fn with_bodies(bodies: &[&str]) -> Self {
        let messages = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| QueueMessage {
                message_id: Some(format!("msg-{i}")),
                body: body.to_string(),
                receipt_handle: format!("rh-{i}"),
            })
            .collect();

        Self {
            incoming: Mutex::new(messages),
            ..Default::default()
        }
    }

    pub fn receives(&self) -> Vec<(String, i32, i32)> {
        self.receives.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }

    /// Sends and deletes interleaved in the order they happened.
    pub fn ops(&self) -> Vec<QueueOp> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueClient for FakeQueue {
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        self.receives
            .lock()
            .unwrap()
            .push((queue_url.to_string(), max_messages, wait_time_seconds));

        if let Some(gate) = &self.receive_gate {
            gate.notified().await;
        }

        if self.fail_receive {
            return Err(QueueError::Receive("throttled".to_string()));
        }

        let mut incoming = self.incoming.lock().unwrap();
        let take = incoming.len().min(max_messages.max(0) as usize);
        Ok(incoming.drain(..take).collect())
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        self.deleted
            .lock()
            .unwrap()
            .push((queue_url.to_string(), receipt_handle.to_string()));
        self.ops.lock().unwrap().push(QueueOp::Delete(
            queue_url.to_string(),
            receipt_handle.to_string(),
        ));

        if self.fail_delete {
            return Err(QueueError::Delete("receipt handle expired".to_string()));
        }
        Ok(())
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<(), QueueError> {
        self.sent
            .lock()
            .unwrap()
            .push((queue_url.to_string(), body.to_string()));
        self.ops
            .lock()
            .unwrap()
            .push(QueueOp::Send(queue_url.to_string(), body.to_string()));

        if self.fail_send {
            return Err(QueueError::Send("queue unavailable".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAssigner {
    pub fail: bool,
    /// Panic when asked to assign this username
    pub panic_for: Option<String>,
    pub calls: Mutex<Vec<(UserGroup, String)>>,
}

impl FakeAssigner {
    pub fn calls(&self) -> Vec<(UserGroup, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroupAssigner for FakeAssigner {
    async fn add_user_to_group(
        &self,
        group: UserGroup,
        username: &str,
    ) -> Result<(), IdentityError> {
        if self.panic_for.as_deref() == Some(username) {
            panic!("assigner exploded for {username}");
        }

        self.calls
            .lock()
            .unwrap()
            .push((group, username.to_string()));

        if self.fail {
            return Err(provider_error());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub fail: bool,
    /// Panic on every send, after recording it
    pub panic: bool,
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl FakeNotifier {
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));

        if self.panic {
            panic!("notifier exploded for {recipient}");
        }
        if self.fail {
            return Err(NotifyError::Send("MessageRejected".to_string()));
        }
        Ok(())
    }
}

/// Identity provider that accepts everything unless told to fail.
#[derive(Default)]
pub struct FakeIdentityProvider {
    pub fail: bool,
    pub sign_ups: Mutex<Vec<SignUp>>,
    /// (username, password, secret_hash)
    pub logins: Mutex<Vec<(String, String, String)>>,
    /// (username, confirmation_code, secret_hash)
    pub confirmations: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_up(&self, request: SignUp) -> Result<(), IdentityError> {
        self.sign_ups.lock().unwrap().push(request);
        if self.fail {
            return Err(IdentityError::Provider {
                code: "UsernameExistsException".to_string(),
                message: "An account with the given email already exists.".to_string(),
            });
        }
        Ok(())
    }

    async fn initiate_auth(
        &self,
        username: &str,
        password: &str,
        secret_hash: &str,
    ) -> Result<AuthTokens, IdentityError> {
        self.logins.lock().unwrap().push((
            username.to_string(),
            password.to_string(),
            secret_hash.to_string(),
        ));
        if self.fail {
            return Err(IdentityError::Provider {
                code: "NotAuthorizedException".to_string(),
                message: "Incorrect username or password.".to_string(),
            });
        }
        Ok(AuthTokens {
            access_token: "access-token".to_string(),
            expires_in: 3600,
            token_type: "Bearer".to_string(),
            refresh_token: Some("refresh-token".to_string()),
            id_token: Some("id-token".to_string()),
        })
    }

    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &str,
        secret_hash: &str,
    ) -> Result<(), IdentityError> {
        self.confirmations.lock().unwrap().push((
            username.to_string(),
            confirmation_code.to_string(),
            secret_hash.to_string(),
        ));
        if self.fail {
            return Err(IdentityError::Provider {
                code: "CodeMismatchException".to_string(),
                message: "Invalid verification code provided.".to_string(),
            });
        }
        Ok(())
    }
}
