//! Request bodies accepted by the authentication façade.

use serde::Deserialize;

use crate::error::AuthError;

/// Sign-up request.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub is_merchant: bool,
}

/// Sign-in request.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Email confirmation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub confirmation_code: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Violations::default();
        v.email("email", &self.email);
        v.required("password", &self.password);
        v.required("name", &self.name);
        v.required("document", &self.document);
        v.finish()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Violations::default();
        v.required("username", &self.username);
        v.required("password", &self.password);
        v.finish()
    }
}

impl ConfirmEmailRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Violations::default();
        v.email("email", &self.email);
        v.required("confirmationCode", &self.confirmation_code);
        v.finish()
    }
}

/// Collects field violations as `"field: problem"` strings.
#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.0.push(format!("{field}: must not be blank"));
            return false;
        }
        true
    }

    fn email(&mut self, field: &str, value: &str) {
        if !self.required(field, value) {
            return;
        }
        // Any whitespace, including padding, makes the address invalid
        let valid = !value.contains(char::is_whitespace)
            && value
                .split_once('@')
                .map(|(local, domain)| {
                    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                })
                .unwrap_or(false);
        if !valid {
            self.0.push(format!("{field}: must be a well-formed email address"));
        }
    }

    fn finish(self) -> Result<(), AuthError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(self.0))
        }
    }
}
