use async_trait::async_trait;
use std::any::Any;
use std::fmt;

/// A fully-formed outgoing message, personalization already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub from: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

#[derive(Debug)]
#[allow(dead_code)]
pub enum MailError {
    Connection(String),
    Timeout(String),
    Resolution(String),
    Greeting(String),
    Auth(String),
    InvalidEmailAddress(String),
    SendError(String),
    EnvVarMissing(String),
    Other(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::Connection(e) => write!(f, "Connection error: {}", e),
            MailError::Timeout(e) => write!(f, "Send timed out: {}", e),
            MailError::Resolution(e) => write!(f, "Could not resolve mail host: {}", e),
            MailError::Greeting(e) => write!(f, "No greeting from mail host: {}", e),
            MailError::Auth(e) => write!(f, "Authentication failed: {}", e),
            MailError::InvalidEmailAddress(e) => write!(f, "Invalid Address: {}", e),
            MailError::SendError(e) => write!(f, "Send error: {}", e),
            MailError::EnvVarMissing(e) => write!(f, "Env Var Missing: {}", e),
            MailError::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

use lettre::transport::smtp::Error as SmtpError;

impl From<SmtpError> for MailError {
    fn from(err: SmtpError) -> Self {
        let text = err.to_string();
        if err.is_timeout() {
            return MailError::Timeout(text);
        }
        if err.is_permanent() || err.is_transient() {
            // The server answered; pick auth failures out of the responses.
            let lowered = text.to_ascii_lowercase();
            if lowered.contains("auth") || lowered.contains("credential") {
                return MailError::Auth(text);
            }
            return MailError::SendError(text);
        }
        if let Some(kind) = io_error_kind(&err) {
            use std::io::ErrorKind;
            return match kind {
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected => MailError::Connection(text),
                ErrorKind::TimedOut => MailError::Timeout(text),
                _ => classify_network_text(text),
            };
        }
        classify_network_text(text)
    }
}

fn classify_network_text(text: String) -> MailError {
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("resolve") || lowered.contains("lookup") || lowered.contains("dns") {
        MailError::Resolution(text)
    } else if lowered.contains("greeting") {
        MailError::Greeting(text)
    } else if lowered.contains("connection") || lowered.contains("refused") {
        MailError::Connection(text)
    } else {
        MailError::Other(text)
    }
}

fn io_error_kind(err: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = cause.source();
    }
    None
}

impl From<std::env::VarError> for MailError {
    fn from(err: std::env::VarError) -> Self {
        MailError::EnvVarMissing(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<AddressError> for MailError {
    fn from(e: AddressError) -> Self {
        MailError::InvalidEmailAddress(e.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a fully-formed message, returning its message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError>;
    #[allow(dead_code)]
    fn as_any(&self) -> &dyn Any;
}

mod mock_mailer;
mod smtp_impl;

use lettre::address::AddressError;
pub use mock_mailer::MockMailer;
pub use smtp_impl::SmtpMailer;
