//! Cognito `SECRET_HASH` computation.
//!
//! App clients configured with a client secret must send a secret hash with
//! every sign-up, sign-in and confirmation call.
//! Reference: https://docs.aws.amazon.com/cognito/latest/developerguide/signing-up-users-in-your-app.html#cognito-user-pools-computing-secret-hash

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, error};

use crate::error::SecretHashError;

type HmacSha256 = Hmac<Sha256>;

/// Calculate the secret hash for a Cognito user.
///
/// `Base64(HMAC-SHA256(key = client_secret, message = username ++ client_id))`
///
/// # Arguments
///
/// * `client_id` - The app client ID
/// * `client_secret` - The app client secret
/// * `username` - The user the request is made for
///
/// # Returns
///
/// The padded, standard-alphabet base64 encoding of the 32-byte MAC.
pub fn calculate_secret_hash(
    client_id: &str,
    client_secret: &str,
    username: &str,
) -> Result<String, SecretHashError> {
    for (field, value) in [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("username", username),
    ] {
        if value.is_empty() {
            error!(field = field, "cognito_hash_empty_input");
            return Err(SecretHashError::EmptyInput(field));
        }
    }

    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes()).map_err(|e| {
        error!(error = %e, "cognito_hash_key_init_failed");
        SecretHashError::KeyInit(e.to_string())
    })?;

    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());

    let secret_hash = STANDARD.encode(mac.finalize().into_bytes());

    debug!(username = %username, "cognito_hash_success");

    Ok(secret_hash)
}
