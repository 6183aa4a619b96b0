//! Outgoing mail for the relay: SMTP for real delivery, an outbox directory
//! for development.

use async_trait::async_trait;
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

impl OutgoingMail {
    /// Header values must be single-line; a CR or LF would start a new header.
    pub fn check_headers(&self) -> Result<(), MailError> {
        let headers = [
            ("From", &self.from_name),
            ("From", &self.from_address),
            ("To", &self.to),
            ("Reply-To", &self.reply_to),
            ("Subject", &self.subject),
        ];
        for (name, value) in headers {
            if value.contains(['\r', '\n']) {
                return Err(MailError::InvalidHeader(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("could not write mail to outbox: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} header contains a line break")]
    InvalidHeader(&'static str),
    #[error("invalid mail address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

fn address(value: &str) -> Result<Address, MailError> {
    value.trim().parse::<Address>().map_err(|e| MailError::InvalidAddress {
        address: value.to_string(),
        reason: e.to_string(),
    })
}

/// Sends through an SMTP server over implicit TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, username: String, password: String) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { transport })
    }

    pub fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
        mail.check_headers()?;
        Message::builder()
            .from(Mailbox::new(Some(mail.from_name.clone()), address(&mail.from_address)?))
            .reply_to(Mailbox::new(None, address(&mail.reply_to)?))
            .to(Mailbox::new(None, address(&mail.to)?))
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text.clone())
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = Self::build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!(to = %mail.to, "estimate mail sent over SMTP");
        Ok(())
    }
}

/// Drops each message into a directory as an RFC 822-style text file, for a
/// downstream MTA or an operator to pick up.
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn render(mail: &OutgoingMail) -> String {
        format!(
            "From: {} <{}>\nTo: {}\nReply-To: {}\nDate: {}\nSubject: {}\n\n{}\n",
            mail.from_name,
            mail.from_address,
            mail.to,
            mail.reply_to,
            Utc::now().to_rfc2822(),
            mail.subject,
            mail.text
        )
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        mail.check_headers()?;
        fs::create_dir_all(&self.dir).await?;
        let path = self
            .dir
            .join(format!("{}-{}.eml", Utc::now().format("%Y%m%dT%H%M%S"), Uuid::new_v4()));
        fs::write(&path, Self::render(mail)).await?;
        info!(path = %path.display(), to = %mail.to, "estimate mail written to outbox");
        Ok(())
    }
}
