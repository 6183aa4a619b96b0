//! Runtime configuration for the transport layer.
//!
//! The estimation engine takes no configuration; these settings only shape
//! the relay server and the optional advisory provider. Values come from the
//! environment (a `.env` file is loaded by the binary).

use anyhow::{bail, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::advisory::{CompletionProvider, LlmAdvisor, NarrativeAdvisor, OllamaProvider, OpenAICompatibleProvider};
use crate::engine::{Estimator, DEFAULT_ADVISORY_TIMEOUT};
use crate::services::{Mailer, OutboxMailer, SmtpMailer};

fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match var(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => bail!("{} has an invalid value: {}", key, raw),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    pub outbox_dir: PathBuf,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// SMTP delivery is used only when a password is configured.
    pub smtp_password: Option<String>,
    /// Display name on outgoing mail.
    pub sender_name: String,
    pub sender_address: String,
    pub recipient: String,
    /// Sends allowed per reply-to address per minute.
    pub sends_per_minute: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3001,
            outbox_dir: PathBuf::from("outbox"),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            smtp_password: None,
            sender_name: "WES3 Budget Tool".to_string(),
            sender_address: "budget-tool@localhost".to_string(),
            recipient: "estimates@localhost".to_string(),
            sends_per_minute: 5,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind: var("RELAY_BIND").unwrap_or(defaults.bind),
            port: parse_var("RELAY_PORT", defaults.port)?,
            outbox_dir: var("RELAY_OUTBOX_DIR").map(PathBuf::from).unwrap_or(defaults.outbox_dir),
            smtp_host: var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: parse_var("SMTP_PORT", defaults.smtp_port)?,
            smtp_password: var("EMAIL_PASS"),
            sender_name: defaults.sender_name,
            sender_address: var("EMAIL_USER").unwrap_or(defaults.sender_address),
            recipient: var("RECIPIENT_EMAIL").unwrap_or(defaults.recipient),
            sends_per_minute: parse_var("RELAY_SENDS_PER_MINUTE", defaults.sends_per_minute)?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind, self.port).parse::<SocketAddr>()?)
    }

    pub fn mail_transport(&self) -> MailTransport {
        match &self.smtp_password {
            Some(password) => MailTransport::Smtp {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                username: self.sender_address.clone(),
                password: password.clone(),
            },
            None => MailTransport::Outbox(self.outbox_dir.clone()),
        }
    }

    pub fn build_mailer(&self) -> Result<Arc<dyn Mailer>> {
        let transport = self.mail_transport();
        info!(transport = %transport, "relay mail transport selected");
        Ok(match transport {
            MailTransport::Smtp { host, port, username, password } => {
                Arc::new(SmtpMailer::new(&host, port, username, password)?)
            }
            MailTransport::Outbox(dir) => Arc::new(OutboxMailer::new(dir)),
        })
    }
}

/// Where the relay hands finished mail.
#[derive(Clone, PartialEq)]
pub enum MailTransport {
    Smtp { host: String, port: u16, username: String, password: String },
    Outbox(PathBuf),
}

impl std::fmt::Display for MailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailTransport::Smtp { host, port, username, .. } => write!(f, "smtp://{}@{}:{}", username, host, port),
            MailTransport::Outbox(dir) => write!(f, "outbox {}", dir.display()),
        }
    }
}

impl std::fmt::Debug for MailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MailTransport({})", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryBackend {
    Ollama,
    OpenAI,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryConfig {
    /// `None` disables the narrative entirely.
    pub backend: Option<AdvisoryBackend>,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            backend: None,
            model: "llama3.2:3b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            timeout: DEFAULT_ADVISORY_TIMEOUT,
        }
    }
}

impl AdvisoryConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let backend = match var("ADVISORY_PROVIDER").map(|v| v.to_lowercase()).as_deref() {
            None | Some("none") | Some("off") => None,
            Some("ollama") => Some(AdvisoryBackend::Ollama),
            Some("openai") => Some(AdvisoryBackend::OpenAI),
            Some(other) => bail!("ADVISORY_PROVIDER must be 'ollama', 'openai' or 'none', got '{}'", other),
        };
        Ok(Self {
            backend,
            model: var("ADVISORY_MODEL").unwrap_or(defaults.model),
            base_url: var("ADVISORY_BASE_URL").unwrap_or(defaults.base_url),
            api_key: var("ADVISORY_API_KEY"),
            timeout: Duration::from_secs(parse_var("ADVISORY_TIMEOUT_SECS", defaults.timeout.as_secs())?),
        })
    }

    pub fn build_advisor(&self) -> Result<Option<Arc<dyn NarrativeAdvisor>>> {
        let provider: Arc<dyn CompletionProvider> = match self.backend {
            None => return Ok(None),
            Some(AdvisoryBackend::Ollama) => Arc::new(OllamaProvider::from_url(&self.base_url)?),
            Some(AdvisoryBackend::OpenAI) => Arc::new(OpenAICompatibleProvider::with_timeout(
                self.base_url.clone(),
                self.api_key.clone(),
                self.timeout,
            )?),
        };
        info!(backend = ?self.backend, model = %self.model, "advisory narrative enabled");
        let advisor: Arc<dyn NarrativeAdvisor> = Arc::new(LlmAdvisor::new(provider, self.model.clone()));
        Ok(Some(advisor))
    }

    pub fn build_estimator(&self) -> Result<Estimator> {
        let estimator = Estimator::new().with_advisory_timeout(self.timeout);
        Ok(match self.build_advisor()? {
            Some(advisor) => estimator.with_advisor(advisor),
            None => estimator,
        })
    }
}
