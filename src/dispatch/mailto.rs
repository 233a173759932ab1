use std::time::Duration;

use async_trait::async_trait;

use super::{Delivery, DispatchError, Dispatcher};
use crate::contact::compose::EmailPayload;

/// Simulated send: waits, then returns a `mailto:` link for the visitor's
/// own mail client. Never fails.
pub struct MailtoDispatcher {
    delay: Duration,
}

impl MailtoDispatcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Dispatcher for MailtoDispatcher {
    fn id(&self) -> &str {
        "mailto"
    }

    async fn dispatch(&self, payload: &EmailPayload) -> Result<Delivery, DispatchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::info!(
            to = %payload.to,
            subject = %payload.subject,
            "Email que se enviaría:\n{}",
            payload.body
        );

        Ok(Delivery::Mailto {
            uri: mailto_uri(payload),
        })
    }
}

pub fn mailto_uri(payload: &EmailPayload) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        payload.to,
        encode_component(&payload.subject),
        encode_component(&payload.body)
    )
}

/// Percent-encode a URI component. Spaces become `%20`, which mail clients
/// read reliably where `+` is left literal.
pub fn encode_component(s: &str) -> String {
    // byte_serialize already escapes a literal '+', so every '+' left is a space.
    form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
