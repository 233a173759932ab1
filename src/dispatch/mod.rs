pub mod mailto;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Config;
use crate::contact::compose::EmailPayload;

use mailto::MailtoDispatcher;
use smtp::SmtpDispatcher;

/// How a quote request left the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Delivery {
    /// Handed back to the visitor's mail client through a `mailto:` URI.
    Mailto { uri: String },
    /// Accepted by the SMTP relay.
    Sent,
}

impl Delivery {
    pub fn mailto_uri(&self) -> Option<&str> {
        match self {
            Delivery::Mailto { uri } => Some(uri),
            Delivery::Sent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    InvalidAddress(String),
    Build(String),
    Transport(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::InvalidAddress(msg) => write!(f, "Invalid address: {msg}"),
            DispatchError::Build(msg) => write!(f, "Failed to build email: {msg}"),
            DispatchError::Transport(msg) => write!(f, "Failed to send email: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn id(&self) -> &str;
    async fn dispatch(&self, payload: &EmailPayload) -> Result<Delivery, DispatchError>;
}

/// SMTP when it is configured and the transport builds, `mailto:` otherwise.
pub fn from_config(config: &Config) -> Arc<dyn Dispatcher> {
    if let Some(smtp) = &config.smtp {
        match SmtpDispatcher::new(smtp) {
            Ok(dispatcher) => {
                tracing::info!("SMTP dispatch configured via {}", smtp.host);
                return Arc::new(dispatcher);
            }
            Err(e) => {
                tracing::warn!("SMTP not available, falling back to mailto: {e}");
            }
        }
    }

    Arc::new(MailtoDispatcher::new(config.contact.send_delay))
}
