//! Authgate Web Server - HTTP API for the Cognito user pool.
//!
//! Exposes register, login and email confirmation. Registration also
//! queues the user's group assignment for the worker.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authgate::util::shutdown_signal;
use authgate::web::{router, AppState};
use authgate::{AuthService, CognitoClient, Config, GroupAssignmentPublisher, SqsQueue};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let config = Config::from_env().context("Failed to load configuration")?;
    let cognito_settings = config
        .cognito_settings()
        .context("Web server needs app client credentials")?;
    info!(
        port = config.port,
        aws_region = %config.aws_region,
        user_pool_id = %cognito_settings.user_pool_id,
        client_id = %cognito_settings.client_id,
        queue_url = %config.queue_url,
        "config_loaded"
    );

    let aws_config = config.load_aws_config().await;

    let cognito = Arc::new(CognitoClient::new(
        aws_sdk_cognitoidentityprovider::Client::new(&aws_config),
        &cognito_settings,
    ));
    let queue = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&aws_config)));
    let publisher = GroupAssignmentPublisher::new(queue, config.queue_url.clone());

    let auth = AuthService::new(cognito, publisher, cognito_settings);
    let app = router(AppState::new(auth));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}
