//! Authentication façade.
//!
//! Every identity-provider call carries a `SECRET_HASH`; a successful
//! registration also queues the user's group assignment for the worker.

pub mod service;
pub mod types;

pub use service::AuthService;
pub use types::{ConfirmEmailRequest, LoginRequest, RegisterRequest};
