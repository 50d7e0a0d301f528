//! Group-assignment message processing.
//!
//! This module turns one raw queue body into a Cognito group assignment and
//! an "account ready" email. It never touches the queue; the poller decides
//! what happens to the message based on the returned [`ProcessOutcome`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::cognito::{GroupAssigner, UserGroup};
use crate::error::{IdentityError, InvalidMessage};
use crate::notify::{AccountReadyEmail, Notifier};
use crate::queue::GroupAssignmentMessage;

/// A validated group-assignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    pub email: String,
    pub group: UserGroup,
}

/// Result of processing one message.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The user was added to the group.
    Success(GroupAssignment),
    /// The message can never be applied.
    InvalidMessage(InvalidMessage),
    /// The message was valid but applying it failed.
    UnexpectedFailure(ProcessingFailure),
}

/// Failure while applying an otherwise valid message.
#[derive(Debug, Error)]
pub enum ProcessingFailure {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("message processing panicked: {0}")]
    Panicked(String),
}

impl ProcessingFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingFailure::Identity(e) => e.kind(),
            ProcessingFailure::Panicked(_) => "panic",
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ProcessingFailure::Identity(e) => e.code(),
            ProcessingFailure::Panicked(_) => None,
        }
    }
}

/// Parse and validate a raw message body.
///
/// Checks, in order: the body is a JSON object of the expected shape, both
/// `email` and `group` are present, and `group` names a known group.
pub fn parse_assignment(raw_body: &str) -> Result<GroupAssignment, InvalidMessage> {
    let payload: GroupAssignmentMessage =
        serde_json::from_str(raw_body).map_err(|source| InvalidMessage::Parse {
            body: raw_body.to_string(),
            source,
        })?;

    let (email, group) = match (payload.email, payload.group) {
        (Some(email), Some(group)) => (email, group),
        (email, group) => {
            let missing: Vec<&str> = [
                email.is_none().then_some("email"),
                group.is_none().then_some("group"),
            ]
            .into_iter()
            .flatten()
            .collect();

            return Err(InvalidMessage::MissingFields {
                body: raw_body.to_string(),
                missing: missing.join(", "),
            });
        }
    };

    let group = UserGroup::parse(&group).ok_or_else(|| InvalidMessage::UnknownGroup {
        body: raw_body.to_string(),
        group,
    })?;

    Ok(GroupAssignment { email, group })
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .map(|s| s.as_str())
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
        .to_string()
}

/// Applies group-assignment messages.
#[derive(Clone)]
pub struct MessageProcessor {
    assigner: Arc<dyn GroupAssigner>,
    notifier: Arc<dyn Notifier>,
}

impl MessageProcessor {
    pub fn new(assigner: Arc<dyn GroupAssigner>, notifier: Arc<dyn Notifier>) -> Self {
        Self { assigner, notifier }
    }

    /// Process a single raw message body.
    ///
    /// This function:
    /// 1. Parses and validates the body
    /// 2. Adds the user to the resolved group
    /// 3. Sends the "account ready" email, logging and swallowing failures
    pub async fn process(&self, raw_body: &str) -> ProcessOutcome {
        debug!(body = %raw_body, "worker_sqs_processing");

        let assignment = match parse_assignment(raw_body) {
            Ok(assignment) => assignment,
            Err(invalid) => return ProcessOutcome::InvalidMessage(invalid),
        };

        if let Err(e) = self
            .assigner
            .add_user_to_group(assignment.group, &assignment.email)
            .await
        {
            return ProcessOutcome::UnexpectedFailure(e.into());
        }

        self.notify(&assignment).await;

        info!(
            email = %assignment.email,
            group = %assignment.group,
            "worker_sqs_processed_success"
        );

        ProcessOutcome::Success(assignment)
    }

    /// Best-effort email. A failing or panicking notifier never changes the
    /// outcome of an assignment that already happened.
    async fn notify(&self, assignment: &GroupAssignment) {
        let email = AccountReadyEmail::new(&assignment.email, assignment.group);

        let sent = AssertUnwindSafe(self.notifier.send_email(
            &assignment.email,
            &email.subject,
            &email.body,
        ))
        .catch_unwind()
        .await;

        match sent {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(recipient = %assignment.email, error = %e, "email_sent_failure");
            }
            Err(panic) => {
                error!(
                    recipient = %assignment.email,
                    error = %panic_message(panic.as_ref()),
                    "email_sent_failure"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAssigner, FakeNotifier};

    fn processor(
        assigner: &Arc<FakeAssigner>,
        notifier: &Arc<FakeNotifier>,
    ) -> MessageProcessor {
        MessageProcessor::new(assigner.clone(), notifier.clone())
    }

    #[test]
    fn test_parse_assignment_valid() {
        let assignment = parse_assignment(r#"{"email":"a@b.com","group":"merchant"}"#).unwrap();
        assert_eq!(
            assignment,
            GroupAssignment {
                email: "a@b.com".to_string(),
                group: UserGroup::Merchant,
            }
        );
    }

    #[test]
    fn test_parse_assignment_not_json() {
        let err = parse_assignment("invalid-json").unwrap_err();
        assert_eq!(err.reason(), "parse_error");
        assert_eq!(err.body(), "invalid-json");
    }

    #[test]
    fn test_parse_assignment_wrong_shape() {
        assert_eq!(parse_assignment("null").unwrap_err().reason(), "parse_error");
        assert_eq!(parse_assignment("[1,2]").unwrap_err().reason(), "parse_error");
        assert_eq!(
            parse_assignment(r#"{"email":42,"group":"Merchant"}"#)
                .unwrap_err()
                .reason(),
            "parse_error"
        );
    }

    #[test]
    fn test_parse_assignment_missing_fields() {
        match parse_assignment(r#"{"email":null,"group":null}"#).unwrap_err() {
            InvalidMessage::MissingFields { body, missing } => {
                assert_eq!(body, r#"{"email":null,"group":null}"#);
                assert_eq!(missing, "email, group");
            }
            other => panic!("Expected MissingFields, got {:?}", other),
        }

        match parse_assignment(r#"{"email":"a@b.com"}"#).unwrap_err() {
            InvalidMessage::MissingFields { missing, .. } => assert_eq!(missing, "group"),
            other => panic!("Expected MissingFields, got {:?}", other),
        }

        assert_eq!(parse_assignment("{}").unwrap_err().reason(), "missing_fields");
    }

    #[test]
    fn test_parse_assignment_unknown_group() {
        match parse_assignment(r#"{"email":"a@b.com","group":"Bogus"}"#).unwrap_err() {
            InvalidMessage::UnknownGroup { group, .. } => assert_eq!(group, "Bogus"),
            other => panic!("Expected UnknownGroup, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_process_assigns_and_notifies() {
        let assigner = Arc::new(FakeAssigner::default());
        let notifier = Arc::new(FakeNotifier::default());

        let outcome = processor(&assigner, &notifier)
            .process(r#"{"email":"a@b.com","group":"Merchant"}"#)
            .await;

        assert!(matches!(outcome, ProcessOutcome::Success(_)));
        assert_eq!(assigner.calls(), vec![(UserGroup::Merchant, "a@b.com".to_string())]);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "a@b.com");
        assert_eq!(sent[0].1, "Your account is ready");
        assert!(sent[0].2.contains("Merchant"));
    }

    #[tokio::test]
    async fn test_process_invalid_skips_collaborators() {
        let assigner = Arc::new(FakeAssigner::default());
        let notifier = Arc::new(FakeNotifier::default());
        let processor = processor(&assigner, &notifier);

        for body in [
            "invalid-json",
            r#"{"email":null,"group":null}"#,
            r#"{"email":"a@b.com","group":"Bogus"}"#,
        ] {
            let outcome = processor.process(body).await;
            assert!(matches!(outcome, ProcessOutcome::InvalidMessage(_)), "{body}");
        }

        assert!(assigner.calls().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_process_assignment_failure_is_unexpected() {
        let assigner = Arc::new(FakeAssigner {
            fail: true,
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());

        let outcome = processor(&assigner, &notifier)
            .process(r#"{"email":"a@b.com","group":"Standard"}"#)
            .await;

        match outcome {
            ProcessOutcome::UnexpectedFailure(failure) => {
                assert_eq!(failure.kind(), "provider");
                assert_eq!(failure.code(), Some("UserNotFoundException"));
            }
            other => panic!("Expected UnexpectedFailure, got {:?}", other),
        }
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_process_swallows_notification_failure() {
        let assigner = Arc::new(FakeAssigner::default());
        let notifier = Arc::new(FakeNotifier {
            fail: true,
            ..Default::default()
        });

        let outcome = processor(&assigner, &notifier)
            .process(r#"{"email":"a@b.com","group":"Standard"}"#)
            .await;

        assert!(matches!(outcome, ProcessOutcome::Success(_)));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_process_swallows_notifier_panic() {
        let assigner = Arc::new(FakeAssigner::default());
        let notifier = Arc::new(FakeNotifier {
            panic: true,
            ..Default::default()
        });

        let outcome = processor(&assigner, &notifier)
            .process(r#"{"email":"a@b.com","group":"Merchant"}"#)
            .await;

        assert!(matches!(outcome, ProcessOutcome::Success(_)));
        assert_eq!(assigner.calls(), vec![(UserGroup::Merchant, "a@b.com".to_string())]);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn test_panic_message() {
        let owned: Box<dyn std::any::Any + Send> = Box::new("boom".to_string());
        let borrowed: Box<dyn std::any::Any + Send> = Box::new("bang");
        let other: Box<dyn std::any::Any + Send> = Box::new(7u8);

        assert_eq!(panic_message(owned.as_ref()), "boom");
        assert_eq!(panic_message(borrowed.as_ref()), "bang");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
