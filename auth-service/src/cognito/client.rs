//! Cognito identity provider client.
//!
//! The rest of the crate talks to Cognito through the [`IdentityProvider`]
//! and [`GroupAssigner`] traits so the façade and the worker can be tested
//! without AWS.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client;
use serde::Serialize;
use tracing::{error, info};

use super::group::UserGroup;
use crate::config::CognitoSettings;
use crate::error::IdentityError;

const USERNAME: &str = "USERNAME";
const PASSWORD: &str = "PASSWORD";
const SECRET_HASH: &str = "SECRET_HASH";

/// Adds users to Cognito groups.
#[async_trait]
pub trait GroupAssigner: Send + Sync {
    async fn add_user_to_group(&self, group: UserGroup, username: &str)
        -> Result<(), IdentityError>;
}

/// Client-facing Cognito operations used by the authentication façade.
///
/// Callers compute the secret hash and pass it in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: SignUp) -> Result<(), IdentityError>;

    async fn initiate_auth(
        &self,
        username: &str,
        password: &str,
        secret_hash: &str,
    ) -> Result<AuthTokens, IdentityError>;

    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &str,
        secret_hash: &str,
    ) -> Result<(), IdentityError>;
}

/// A sign-up call.
#[derive(Clone, PartialEq, Eq)]
pub struct SignUp {
    pub username: String,
    pub password: String,
    pub secret_hash: String,
    /// User pool attributes as (name, value) pairs.
    pub attributes: Vec<(String, String)>,
}

/// Tokens issued after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub expires_in: i32,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

/// Cognito user pool client backed by the AWS SDK.
///
/// Admin calls only need the pool; client-facing calls also need an app
/// client id.
#[derive(Clone)]
pub struct CognitoClient {
    client: Client,
    user_pool_id: String,
    client_id: Option<String>,
}

impl CognitoClient {
    /// Client for both admin and app-client operations.
    pub fn new(client: Client, settings: &CognitoSettings) -> Self {
        Self {
            client,
            user_pool_id: settings.user_pool_id.clone(),
            client_id: Some(settings.client_id.clone()),
        }
    }

    /// Client for admin operations on a pool.
    pub fn for_user_pool(client: Client, user_pool_id: String) -> Self {
        Self {
            client,
            user_pool_id,
            client_id: None,
        }
    }

    fn client_id(&self) -> Result<&str, IdentityError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| IdentityError::Client("no app client id configured".to_string()))
    }
}

#[async_trait]
impl GroupAssigner for CognitoClient {
    async fn add_user_to_group(
        &self,
        group: UserGroup,
        username: &str,
    ) -> Result<(), IdentityError> {
        info!(username = %username, group = %group, "cognito_add_user_group_start");

        self.client
            .admin_add_user_to_group()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .group_name(group.group_name())
            .send()
            .await
            .map_err(|e| log_failure(classify_sdk_error(e), username, "admin_add_user_to_group"))?;

        info!(username = %username, group = %group, "cognito_add_user_group_success");

        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_up(&self, request: SignUp) -> Result<(), IdentityError> {
        let mut call = self
            .client
            .sign_up()
            .client_id(self.client_id()?)
            .secret_hash(&request.secret_hash)
            .username(&request.username)
            .password(&request.password);

        for (name, value) in &request.attributes {
            let attribute = AttributeType::builder()
                .name(name)
                .value(value)
                .build()
                .map_err(|e| IdentityError::Client(e.to_string()))?;
            call = call.user_attributes(attribute);
        }

        let output = call
            .send()
            .await
            .map_err(|e| log_failure(classify_sdk_error(e), &request.username, "sign_up"))?;

        info!(
            username = %request.username,
            user_confirmed = output.user_confirmed(),
            "cognito_sign_up_success"
        );

        Ok(())
    }

    async fn initiate_auth(
        &self,
        username: &str,
        password: &str,
        secret_hash: &str,
    ) -> Result<AuthTokens, IdentityError> {
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(self.client_id()?)
            .auth_parameters(USERNAME, username)
            .auth_parameters(PASSWORD, password)
            .auth_parameters(SECRET_HASH, secret_hash)
            .send()
            .await
            .map_err(|e| log_failure(classify_sdk_error(e), username, "initiate_auth"))?;

        // A pending challenge (new password, MFA, ...) returns no tokens
        let Some(result) = output.authentication_result() else {
            let challenge = output
                .challenge_name()
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "none".to_string());
            return Err(log_failure(
                IdentityError::Unexpected(format!(
                    "authentication returned no tokens (challenge: {challenge})"
                )),
                username,
                "initiate_auth",
            ));
        };

        info!(
            username = %username,
            expires_in = result.expires_in(),
            "cognito_initiate_auth_success"
        );

        Ok(AuthTokens {
            access_token: result.access_token().unwrap_or_default().to_string(),
            expires_in: result.expires_in(),
            token_type: result.token_type().unwrap_or("Bearer").to_string(),
            refresh_token: result.refresh_token().map(str::to_string),
            id_token: result.id_token().map(str::to_string),
        })
    }

    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &str,
        secret_hash: &str,
    ) -> Result<(), IdentityError> {
        self.client
            .confirm_sign_up()
            .client_id(self.client_id()?)
            .secret_hash(secret_hash)
            .username(username)
            .confirmation_code(confirmation_code)
            .send()
            .await
            .map_err(|e| log_failure(classify_sdk_error(e), username, "confirm_sign_up"))?;

        info!(username = %username, "cognito_confirm_sign_up_success");

        Ok(())
    }
}

/// Split SDK failures into provider rejections and client-side failures.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> IdentityError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            IdentityError::Provider {
                code: service_error.code().unwrap_or("unknown").to_string(),
                message: service_error.message().unwrap_or("n/a").to_string(),
            }
        }
        SdkError::ConstructionFailure(_)
        | SdkError::DispatchFailure(_)
        | SdkError::ResponseError(_)
        | SdkError::TimeoutError(_) => {
            IdentityError::Client(DisplayErrorContext(&err).to_string())
        }
        _ => IdentityError::Unexpected(DisplayErrorContext(&err).to_string()),
    }
}

fn log_failure(err: IdentityError, username: &str, operation: &'static str) -> IdentityError {
    error!(
        username = %username,
        operation = operation,
        error_kind = err.kind(),
        error_code = err.code().unwrap_or("n/a"),
        error = %err,
        "cognito_operation_failed"
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_tokens_serialize_camel_case() {
        let tokens = AuthTokens {
            access_token: "access".to_string(),
            expires_in: 3600,
            token_type: "Bearer".to_string(),
            refresh_token: Some("refresh".to_string()),
            id_token: None,
        };

        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(json["accessToken"], "access");
        assert_eq!(json["expiresIn"], 3600);
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["refreshToken"], "refresh");
        assert!(json.get("idToken").is_none());
    }

    #[test]
    fn test_log_failure_returns_error_unchanged() {
        let err = log_failure(
            IdentityError::Client("timeout".to_string()),
            "a@b.com",
            "sign_up",
        );
        assert!(matches!(err, IdentityError::Client(ref detail) if detail == "timeout"));
    }
}
