//! Cognito integration.
//!
//! - `secret_hash`: the `SECRET_HASH` MAC required by client-secret app clients
//! - `group`: the closed set of user groups
//! - `client`: SDK-backed client behind the `IdentityProvider` and
//!   `GroupAssigner` traits

pub mod client;
pub mod group;
pub mod secret_hash;

pub use client::{AuthTokens, CognitoClient, GroupAssigner, IdentityProvider, SignUp};
pub use group::UserGroup;
pub use secret_hash::calculate_secret_hash;
