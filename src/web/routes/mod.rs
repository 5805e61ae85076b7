//! Contains all the routes that this application can handle.

mod api;

// re-export errors
pub use api::subscribe::SubscribeError;

use crate::{email_client::EmailSender, AppState};

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes<S: EmailSender>(app_state: AppState<S>) -> Router {
    Router::new()
        .nest("/api", api_routes(app_state))
        .route("/health-check", get(health_check))
}

/// API - Routes nested under "/api" path
fn api_routes<S: EmailSender>(app_state: AppState<S>) -> Router {
    Router::new()
        .route("/subscribe", post(api::subscribe::<S>))
        .with_state(app_state)
}
