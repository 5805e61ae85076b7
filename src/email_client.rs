use std::future::Future;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// A single outbound email addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// The provider's acceptance reply, `id` is opaque and forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// Anything that can hand an `EmailMessage` to a transactional email provider.
///
/// Handlers are generic over this trait so the provider can be swapped for a test double.
pub trait EmailSender: Send + Sync + 'static {
    fn send_email(&self, message: &EmailMessage)
        -> impl Future<Output = Result<SentEmail>> + Send;
}

#[derive(Debug)]
pub struct EmailClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    pub sender: String,
    auth_token: SecretString,
}

impl EmailClient {
    /// `sender` is the full identity, e.g. `Publisher <newsletter@yourdomain.com>`.
    pub fn new<S: AsRef<str>>(
        url: S,
        sender: String,
        auth_token: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let mut url =
            reqwest::Url::parse(url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;
        // `join` replaces the last segment unless the base ends with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(EmailClient {
            http_client,
            url,
            sender,
            auth_token,
        })
    }
}

impl EmailSender for EmailClient {
    async fn send_email(&self, message: &EmailMessage) -> Result<SentEmail> {
        let url = self
            .url
            .join("emails")
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let email_content = EmailContent {
            from: &self.sender,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.auth_token.expose_secret())
            .json(&email_content)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let sent = resp.json::<SentEmail>().await?;
        Ok(sent)
    }
}

#[derive(Serialize)]
pub struct EmailContent<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse url: {0}")]
    UrlParsing(String),
    #[error("provider rejected the email with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
