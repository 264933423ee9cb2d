use async_trait::async_trait;
use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{MailError, Mailer, OutgoingEmail};

#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new() -> Result<Self, anyhow::Error> {
        let host = std::env::var("SMTP_HOST")?;
        let username = std::env::var("SMTP_USERNAME")?;
        let password = std::env::var("SMTP_PASSWORD")?;
        let port: u16 = std::env::var("SMTP_PORT")?.parse()?;

        let disabled_tls = std::env::var("SMTP_TLS_DISABLED")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let transport = if disabled_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
                .port(port)
                .build()
        } else {
            let creds = Credentials::new(username, password);
            let tls = TlsParameters::new(host.clone())?;

            AsyncSmtpTransport::<Tokio1Executor>::relay(&host)?
                .port(port)
                .tls(Tls::Required(tls))
                .credentials(creds)
                .build()
        };

        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    fn parse_mailbox(address: &str, name: Option<&str>) -> Result<Mailbox, MailError> {
        let mailbox = match name {
            Some(name) => format!("{} <{}>", name, address)
                .parse()
                .map_err(|e: AddressError| MailError::InvalidEmailAddress(e.to_string()))?,
            None => address
                .parse()
                .map_err(|e: AddressError| MailError::InvalidEmailAddress(e.to_string()))?,
        };
        Ok(mailbox)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        let mut builder = Message::builder()
            .from(Self::parse_mailbox(&email.from, email.from_name.as_deref())?)
            .to(Self::parse_mailbox(&email.to, None)?)
            .subject(email.subject.clone());

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(Self::parse_mailbox(reply_to, None)?);
        }
        for cc in &email.cc {
            builder = builder.cc(Self::parse_mailbox(cc, None)?);
        }
        for bcc in &email.bcc {
            builder = builder.bcc(Self::parse_mailbox(bcc, None)?);
        }

        let message_id = format!("<{}@coldwire>", Uuid::new_v4());
        builder = builder.message_id(Some(message_id.clone()));

        let message = match &email.text {
            Some(text) => builder.multipart(MultiPart::alternative_plain_html(
                text.clone(),
                email.html.clone(),
            ))?,
            None => builder
                .header(ContentType::TEXT_HTML)
                .body(email.html.clone())?,
        };

        self.transport.send(message).await?;
        Ok(message_id)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
