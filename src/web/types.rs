//! Request and response bodies of the `web` module and the structs that need validation.

use serde::Serialize;
use serde_json::{Map, Value};
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

/// Greeting name used when the subscriber does not provide one.
pub const DEFAULT_DISPLAY_NAME: &str = "Reader";

// ###################################
// ->   STRUCTS
// ###################################
/// Subscription request as read from the request body.
/// Both fields are optional so that a missing email is reported by the handler
/// instead of being rejected while reading the body.
#[derive(Debug, Default)]
pub struct SubscriptionRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
}

impl SubscriptionRequest {
    /// Reads the `{ "email": ..., "firstName": ... }` JSON body.
    ///
    /// An empty body or a JSON value that is not an object carries no fields.
    /// Falsy values (`null`, `false`, `0`, `""`) count as absent.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, DataParsingError> {
        if body.trim_ascii().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|er| DataParsingError::BodyNotJson(er.to_string()))?;

        let Value::Object(fields) = value else {
            return Ok(Self::default());
        };

        Ok(SubscriptionRequest {
            email: text_field(&fields, "email")?,
            first_name: text_field(&fields, "firstName")?,
        })
    }

    /// The recipient address, if one was provided and is not empty.
    pub fn recipient(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }

    /// The name to greet the subscriber with, falling back to `DEFAULT_DISPLAY_NAME`.
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

fn text_field(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, DataParsingError> {
    match fields.get(name) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(num)) if num.as_f64() == Some(0.0) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(DataParsingError::FieldNotText(name)),
    }
}

/// Body returned to the client once the provider accepted the welcome email.
#[derive(Debug, Serialize)]
pub struct SubscriptionResult {
    pub message: &'static str,
    pub id: String,
}

impl SubscriptionResult {
    pub fn new(id: String) -> Self {
        Self {
            message: "Subscription successful",
            id,
        }
    }
}

/// Validated Email
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        if value.validate_email() {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email invalid")]
    EmailInvalid,
    #[error("email too long")]
    EmailTooLong,

    #[error("request body is not valid JSON: {0}")]
    BodyNotJson(String),
    #[error("field '{0}' must be a string")]
    FieldNotText(&'static str),
    #[error("failed to read the request body: {0}")]
    BodyUnreadable(String),
}
