//! Configuration module for environment variable parsing.
//!
//! Configuration is read once at start-up into an immutable [`Config`] that
//! is passed to every component that needs it.

use std::env;
use std::fmt;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::warn;

use crate::error::ConfigError;

/// SQS caps a single receive at 10 messages.
const SQS_MAX_BATCH: i32 = 10;

/// SQS caps long polling at 20 seconds.
const SQS_MAX_WAIT_SECONDS: i32 = 20;

/// Application configuration loaded from environment variables.
///
/// Only settings both binaries need are required here. Binary-specific
/// settings are optional and checked by [`Config::cognito_settings`],
/// [`Config::queue_settings`] and [`Config::require_sender_email`].
#[derive(Clone)]
pub struct Config {
    /// AWS region for every client
    pub aws_region: String,

    pub user_pool_id: String,

    /// App client credentials (web only)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// Queue carrying group-assignment messages
    pub queue_url: String,

    /// Dead-letter queue (worker only)
    pub dlq_url: Option<String>,

    pub fixed_rate_ms: u64,
    pub max_messages: i32,
    pub wait_time_seconds: i32,

    /// Sender address for notification emails (worker only)
    pub ses_sender_email: Option<String>,

    /// Port for the web server to listen on
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("aws_region", &self.aws_region)
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("queue_url", &self.queue_url)
            .field("dlq_url", &self.dlq_url)
            .field("fixed_rate_ms", &self.fixed_rate_ms)
            .field("max_messages", &self.max_messages)
            .field("wait_time_seconds", &self.wait_time_seconds)
            .field("ses_sender_email", &self.ses_sender_email)
            .field("port", &self.port)
            .finish()
    }
}

/// Cognito user pool and app client settings.
#[derive(Clone)]
pub struct CognitoSettings {
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for CognitoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CognitoSettings")
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Source queue, dead-letter queue and polling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    /// Queue carrying group-assignment messages
    pub queue_url: String,

    /// Queue receiving messages that could not be processed
    pub dlq_url: String,

    /// Interval in milliseconds between polling ticks
    pub fixed_rate_ms: u64,

    /// Maximum number of messages per receive (1 - 10)
    pub max_messages: i32,

    /// Long-poll wait in seconds (0 - 20)
    pub wait_time_seconds: i32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        Ok(Config {
            aws_region: vars
                .optional("AWS_REGION")
                .unwrap_or_else(|| "us-east-1".to_string()),

            user_pool_id: vars.required("COGNITO_USER_POOL_ID")?,
            client_id: vars.optional("COGNITO_CLIENT_ID"),
            client_secret: vars.optional("COGNITO_CLIENT_SECRET"),

            queue_url: vars.required("SQS_QUEUE_URL")?,
            dlq_url: vars.optional("SQS_DLQ_URL"),
            fixed_rate_ms: vars.parsed("SQS_FIXED_RATE_MS").unwrap_or(5000),
            max_messages: clamp(
                "SQS_MAX_MESSAGES",
                vars.parsed("SQS_MAX_MESSAGES").unwrap_or(SQS_MAX_BATCH),
                1,
                SQS_MAX_BATCH,
            ),
            wait_time_seconds: clamp(
                "SQS_WAIT_TIME_SECONDS",
                vars.parsed("SQS_WAIT_TIME_SECONDS")
                    .unwrap_or(SQS_MAX_WAIT_SECONDS),
                0,
                SQS_MAX_WAIT_SECONDS,
            ),

            ses_sender_email: vars.optional("SES_SENDER_EMAIL"),

            port: vars.parsed("PORT").unwrap_or(8080),
        })
    }

    /// Pool and app client settings, required by the web server.
    pub fn cognito_settings(&self) -> Result<CognitoSettings, ConfigError> {
        Ok(CognitoSettings {
            user_pool_id: self.user_pool_id.clone(),
            client_id: self
                .client_id
                .clone()
                .ok_or(ConfigError::Missing("COGNITO_CLIENT_ID"))?,
            client_secret: self
                .client_secret
                .clone()
                .ok_or(ConfigError::Missing("COGNITO_CLIENT_SECRET"))?,
        })
    }

    /// Polling settings, required by the worker.
    pub fn queue_settings(&self) -> Result<QueueSettings, ConfigError> {
        Ok(QueueSettings {
            queue_url: self.queue_url.clone(),
            dlq_url: self
                .dlq_url
                .clone()
                .ok_or(ConfigError::Missing("SQS_DLQ_URL"))?,
            fixed_rate_ms: self.fixed_rate_ms,
            max_messages: self.max_messages,
            wait_time_seconds: self.wait_time_seconds,
        })
    }

    /// Sender address, required by the worker for notifications.
    pub fn require_sender_email(&self) -> Result<&str, ConfigError> {
        self.ses_sender_email
            .as_deref()
            .ok_or(ConfigError::Missing("SES_SENDER_EMAIL"))
    }

    /// Shared AWS SDK configuration for the configured region.
    ///
    /// Credentials come from the default provider chain.
    pub async fn load_aws_config(&self) -> SdkConfig {
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.aws_region.clone()))
            .load()
            .await
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Trimmed, non-empty value.
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        let raw = self.optional(name)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(env_var = name, value = %raw, "Invalid value, using default");
                None
            }
        }
    }
}

fn clamp(name: &str, value: i32, min: i32, max: i32) -> i32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(env_var = name, value = value, clamped = clamped, "Value out of range, clamping");
    }
    clamped
}
