use std::any::Any;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{MailError, Mailer, OutgoingEmail};

/// A mock mailer that records sent emails for testing purposes.
#[derive(Debug, Default)]
pub struct MockMailer {
    pub sent_emails: Mutex<Vec<OutgoingEmail>>,
    pub fail_send: bool,
    /// Recipient addresses whose sends fail, for per-contact failure tests.
    pub fail_recipients: Vec<String>,
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        if self.fail_send || self.fail_recipients.contains(&email.to) {
            return Err(MailError::Connection("mock failure".into()));
        }
        let mut sent = self.sent_emails.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("<mock-{}@coldwire>", sent.len()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sent_emails() {
        let mailer = MockMailer::default();
        let email = OutgoingEmail {
            to: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            from: "outreach@example.com".to_string(),
            ..Default::default()
        };
        let message_id = mailer.send(&email).await.unwrap();
        assert!(message_id.starts_with("<mock-"));
        assert_eq!(mailer.sent_emails.lock().unwrap().as_slice(), &[email]);
    }

    #[tokio::test]
    async fn fail_send_rejects_everything() {
        let mailer = MockMailer {
            fail_send: true,
            ..Default::default()
        };
        let err = mailer.send(&OutgoingEmail::default()).await.unwrap_err();
        assert!(matches!(err, MailError::Connection(_)));
    }
}
