//! Authentication façade over the identity provider.

use std::sync::Arc;

use tracing::{info, warn};

use super::types::{ConfirmEmailRequest, LoginRequest, RegisterRequest};
use crate::cognito::{calculate_secret_hash, AuthTokens, IdentityProvider, SignUp, UserGroup};
use crate::config::CognitoSettings;
use crate::error::AuthError;
use crate::queue::GroupAssignmentPublisher;

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    publisher: GroupAssignmentPublisher,
    settings: CognitoSettings,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        publisher: GroupAssignmentPublisher,
        settings: CognitoSettings,
    ) -> Self {
        Self {
            provider,
            publisher,
            settings,
        }
    }

    fn secret_hash(&self, username: &str) -> Result<String, AuthError> {
        Ok(calculate_secret_hash(
            &self.settings.client_id,
            &self.settings.client_secret,
            username,
        )?)
    }

    /// Create the account and queue its group assignment.
    ///
    /// Returns the group the user will be added to once the worker picks up
    /// the event.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserGroup, AuthError> {
        request.validate()?;

        let secret_hash = self.secret_hash(&request.email)?;
        let group = UserGroup::for_registration(request.is_merchant);

        info!(email = %request.email, group = %group, "auth_register_start");

        self.provider
            .sign_up(SignUp {
                username: request.email.clone(),
                password: request.password,
                secret_hash,
                attributes: vec![
                    ("email".to_string(), request.email.clone()),
                    ("name".to_string(), request.name),
                    ("custom:document".to_string(), request.document),
                ],
            })
            .await?;

        self.publisher.publish(&request.email, group).await?;

        info!(email = %request.email, group = %group, "auth_register_success");
        Ok(group)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthTokens, AuthError> {
        request.validate()?;

        let secret_hash = self.secret_hash(&request.username)?;

        match self
            .provider
            .initiate_auth(&request.username, &request.password, &secret_hash)
            .await
        {
            Ok(tokens) => {
                info!(username = %request.username, "auth_login_success");
                Ok(tokens)
            }
            Err(e) => {
                warn!(
                    username = %request.username,
                    kind = e.kind(),
                    code = e.code().unwrap_or("none"),
                    "auth_login_rejected"
                );
                Err(AuthError::Unauthorized(e.to_string()))
            }
        }
    }

    pub async fn confirm_email(&self, request: ConfirmEmailRequest) -> Result<(), AuthError> {
        request.validate()?;

        let secret_hash = self.secret_hash(&request.email)?;

        self.provider
            .confirm_sign_up(&request.email, &request.confirmation_code, &secret_hash)
            .await?;

        info!(email = %request.email, "auth_confirm_email_success");
        Ok(())
    }
}
