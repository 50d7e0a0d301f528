//! HTTP surface for the authentication façade.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /health` | [`health`] |
//! | `POST /auth/register` | [`register`] |
//! | `POST /auth/login` | [`login`] |
//! | `POST /auth/confirm-email` | [`confirm_email`] |

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::ErrorResponse;
pub use handlers::{confirm_email, health, login, register, AppState, HealthResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/confirm-email", post(confirm_email))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
