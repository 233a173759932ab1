use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Delivery, DispatchError, Dispatcher};
use crate::config::{SmtpConfig, TlsMode};
use crate::contact::compose::EmailPayload;

/// Sends quote requests straight to the inbox through an SMTP relay.
pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpDispatcher {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        Ok(Self {
            transport: build_smtp_transport(config)?,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    fn id(&self) -> &str {
        "smtp"
    }

    async fn dispatch(&self, payload: &EmailPayload) -> Result<Delivery, DispatchError> {
        let message = build_message(&self.from, payload)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        tracing::info!(to = %payload.to, "Quote request sent over SMTP");
        Ok(Delivery::Sent)
    }
}

pub fn build_message(from: &str, payload: &EmailPayload) -> Result<Message, DispatchError> {
    let mut builder = Message::builder()
        .from(
            from.parse()
                .map_err(|e| DispatchError::InvalidAddress(format!("from {from}: {e}")))?,
        )
        .to(payload
            .to
            .parse()
            .map_err(|e| DispatchError::InvalidAddress(format!("to {}: {e}", payload.to)))?)
        .subject(payload.subject.clone());

    // A bad customer address only costs the Reply-To header.
    if let Some(reply_to) = payload.reply_to.as_deref() {
        match reply_to.parse::<Mailbox>() {
            Ok(mailbox) => builder = builder.reply_to(mailbox),
            Err(e) => tracing::debug!("Skipping Reply-To {reply_to}: {e}"),
        }
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(payload.body.clone())
        .map_err(|e| DispatchError::Build(e.to_string()))
}

pub fn build_smtp_transport(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let transport = match config.tls {
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP starttls error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
    };

    Ok(transport)
}
