//! Email delivery through Amazon SES (v2 API).

use async_trait::async_trait;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;
use tracing::info;

use super::Notifier;
use crate::error::NotifyError;

const CHARSET: &str = "UTF-8";

/// [`Notifier`] that sends simple text emails from a fixed sender address.
#[derive(Clone)]
pub struct SesNotifier {
    client: Client,
    sender_email: String,
}

impl SesNotifier {
    pub fn new(client: Client, sender_email: String) -> Self {
        Self {
            client,
            sender_email,
        }
    }
}

fn text(data: &str) -> Result<Content, NotifyError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| NotifyError::Build(e.to_string()))
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        let message = Message::builder()
            .subject(text(subject)?)
            .body(Body::builder().text(text(body)?).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.sender_email)
            .destination(Destination::builder().to_addresses(recipient).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| NotifyError::Send(DisplayErrorContext(&e).to_string()))?;

        info!(recipient = %recipient, "email_sent_success");

        Ok(())
    }
}
