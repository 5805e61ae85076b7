//! An HTTP service that greets new newsletter subscribers with a welcome email sent
//! through a transactional email provider.

mod app;
pub mod config;
pub mod email_client;
mod error;
pub mod templ_manager;
pub mod web;

pub use app::{App, AppState, InternalState};
pub use email_client::{EmailClient, EmailSender};
pub use error::{Error, Result};
pub use web::serve;

use tracing_subscriber::EnvFilter;

/// Human readable, compact logging for development. `RUST_LOG` overrides the default `debug` level.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .compact()
        .init();
}

/// JSON logging for production. `RUST_LOG` overrides the default `info` level.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
