//! Authgate Worker - SQS consumer that assigns Cognito groups.
//!
//! Polls the group-assignment queue on a fixed schedule, adds each user to
//! the requested group, emails them, and forwards anything it cannot apply
//! to the dead-letter queue.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authgate::cognito::CognitoClient;
use authgate::notify::SesNotifier;
use authgate::queue::SqsQueue;
use authgate::util::shutdown_signal;
use authgate::worker::{MessageProcessor, QueuePoller};
use authgate::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("worker_starting");

    let config = Config::from_env().context("Failed to load configuration")?;
    let queue_settings = config
        .queue_settings()
        .context("Worker needs a dead-letter queue")?;
    let sender_email = config
        .require_sender_email()
        .context("Worker needs a sender address")?
        .to_string();
    info!(
        aws_region = %config.aws_region,
        user_pool_id = %config.user_pool_id,
        queue_url = %queue_settings.queue_url,
        dlq_url = %queue_settings.dlq_url,
        "config_loaded"
    );

    let aws_config = config.load_aws_config().await;

    let queue = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&aws_config)));
    let cognito = Arc::new(CognitoClient::for_user_pool(
        aws_sdk_cognitoidentityprovider::Client::new(&aws_config),
        config.user_pool_id.clone(),
    ));
    let notifier = Arc::new(SesNotifier::new(
        aws_sdk_sesv2::Client::new(&aws_config),
        sender_email,
    ));

    let processor = MessageProcessor::new(cognito, notifier);
    let poller = QueuePoller::new(queue, processor, queue_settings);

    poller.run(shutdown_signal()).await;

    Ok(())
}
