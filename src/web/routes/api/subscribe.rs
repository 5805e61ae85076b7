use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use tracing::{error, info, instrument};

use crate::{
    email_client::{self, EmailMessage, EmailSender},
    web::{
        self,
        types::{DataParsingError, SubscriptionRequest, SubscriptionResult},
        ClientError, WebResult,
    },
    AppState,
};

#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("the request did not contain an email address")]
    EmailMissing,
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] DataParsingError),
    #[error("failed to render the welcome email: {0}")]
    Template(#[from] tera::Error),
    #[error("email client error: {0}")]
    EmailClient(#[from] email_client::Error),
}

impl SubscribeError {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        match self {
            SubscribeError::EmailMissing => (StatusCode::BAD_REQUEST, ClientError::EmailRequired),
            SubscribeError::InvalidBody(_) => (StatusCode::BAD_REQUEST, ClientError::InvalidBody),
            SubscribeError::Template(_) | SubscribeError::EmailClient(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::EmailSendFailed,
            ),
        }
    }
}

/// Extracts a `SubscriptionRequest` from the request body.
///
/// Unlike `axum::Json` every rejection is a `web::Error`, so the client always gets the
/// `{ "error": ... }` body. A body without a JSON content type carries no fields.
pub struct SubscriptionBody(pub SubscriptionRequest);

impl<S> FromRequest<S> for SubscriptionBody
where
    S: Send + Sync,
{
    type Rejection = web::Error;

    #[instrument(skip_all, name = "SubscriptionBody from_request")]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Ok(Self(SubscriptionRequest::default()));
        }

        let body = Bytes::from_request(req, state).await.map_err(|er| {
            SubscribeError::from(DataParsingError::BodyUnreadable(er.body_text()))
        })?;

        let request =
            SubscriptionRequest::from_json_slice(&body).map_err(SubscribeError::InvalidBody)?;

        Ok(Self(request))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Sends a welcome email to the address in the request body.
///
/// A missing or falsy `email` short-circuits with a 400 before anything is sent.
/// The provider is called exactly once, a failure is logged and surfaced as a 500
/// without retrying.
#[tracing::instrument(name = "Sending welcome email", skip_all)]
pub async fn subscribe<S: EmailSender>(
    State(app_state): State<AppState<S>>,
    SubscriptionBody(request): SubscriptionBody,
) -> WebResult<Json<SubscriptionResult>> {
    let recipient = request.recipient().ok_or(SubscribeError::EmailMissing)?;

    let html = app_state
        .templ_mgr
        .render_welcome(request.display_name())
        .map_err(|er| {
            error!(error = %er, "Failed to render the welcome email");
            SubscribeError::Template(er)
        })?;

    let message = EmailMessage {
        to: recipient.to_string(),
        subject: app_state.subject.clone(),
        html,
    };

    match app_state.email_sender.send_email(&message).await {
        Ok(sent) => {
            info!(email = %recipient, "Email sent successfully");
            Ok(Json(SubscriptionResult::new(sent.id)))
        }
        Err(er) => {
            error!(error = %er, "Provider failed to send the welcome email");
            Err(SubscribeError::EmailClient(er).into())
        }
    }
}
