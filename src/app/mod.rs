use std::{net::SocketAddr, ops::Deref, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::AppConfig,
    email_client::{EmailClient, EmailSender},
    templ_manager::TemplateManager,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the `EmailClient` from the config, binds the listener and returns the `App`
    /// ready to be served.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let email_config = config.email_config;
        let sender = email_config.sender_identity()?;
        let email_timeout = email_config.timeout();
        let email_client = EmailClient::new(
            &email_config.url,
            sender,
            email_config.auth_token,
            email_timeout,
        )?;
        let tm = TemplateManager::init();

        let app_state = AppState::new(email_client, tm, email_config.subject);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState<S = EmailClient> {
    pub email_sender: S,
    pub templ_mgr: TemplateManager,
    pub subject: String,
}

/// Application state shared by every request.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
pub struct AppState<S = EmailClient>(Arc<InternalState<S>>);

impl<S: EmailSender> AppState<S> {
    pub fn new(email_sender: S, templ_mgr: TemplateManager, subject: String) -> Self {
        AppState(Arc::new(InternalState {
            email_sender,
            templ_mgr,
            subject,
        }))
    }
}

// Derived `Clone` would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState(Arc::clone(&self.0))
    }
}

impl<S> Deref for AppState<S> {
    type Target = InternalState<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
