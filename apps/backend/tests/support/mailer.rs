//! Mailer that hands each delivery to the test over a channel.

use std::time::Duration;

use async_trait::async_trait;
use photoshare_backend::notify::{MailError, Mailer};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct ChannelMailer {
    sender: mpsc::UnboundedSender<SentMail>,
}

impl ChannelMailer {
    pub fn new() -> (Self, Outbox) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, Outbox { receiver })
    }
}

#[async_trait]
impl Mailer for ChannelMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.sender
            .send(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .map_err(|e| MailError(e.to_string()))
    }
}

/// Receiving side of a [`ChannelMailer`].
pub struct Outbox {
    receiver: mpsc::UnboundedReceiver<SentMail>,
}

impl Outbox {
    /// Wait up to a second for the next delivery.
    pub async fn next(&mut self) -> Option<SentMail> {
        tokio::time::timeout(Duration::from_secs(1), self.receiver.recv())
            .await
            .ok()
            .flatten()
    }
}
