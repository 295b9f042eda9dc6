//! Welcome notifications sent off the request path.
//!
//! Jobs go onto a bounded queue drained by one background task. Enqueueing
//! never waits: when the queue is full or the worker is gone the job is
//! dropped with a warning, and delivery failures are only logged.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub const WELCOME_SUBJECT: &str = "Welcome to Photoshare!";

/// Welcome emails that may wait for delivery before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeEmail {
    pub email: String,
    pub username: String,
}

impl WelcomeEmail {
    pub fn subject(&self) -> &'static str {
        WELCOME_SUBJECT
    }

    pub fn body(&self) -> String {
        format!(
            "Hi {},\n\nWelcome to Photoshare! Your account is ready. \
             Start sharing photos and connecting with others.\n\n\
             The Photoshare Team",
            self.username
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to deliver mail: {0}")]
pub struct MailError(pub String);

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Mailer that records deliveries in the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        info!(to = %to, subject = %subject, "mail delivered to log");
        Ok(())
    }
}

/// Handle for queueing welcome emails.
#[derive(Clone)]
pub struct WelcomeNotifier {
    sender: mpsc::Sender<WelcomeEmail>,
}

impl WelcomeNotifier {
    /// Start the delivery worker. It exits once every notifier handle has
    /// been dropped and the queue is drained.
    pub fn spawn(mailer: Arc<dyn Mailer>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<WelcomeEmail>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                match mailer.send(&job.email, job.subject(), &job.body()).await {
                    Ok(()) => info!(to = %job.email, "welcome email sent"),
                    Err(e) => error!(to = %job.email, error = %e, "welcome email failed"),
                }
            }
        });

        (Self { sender }, worker)
    }

    /// Queue a welcome email; returns whether it was accepted.
    pub fn enqueue(&self, job: WelcomeEmail) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!(to = %job.email, "welcome queue full; dropping email");
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!(to = %job.email, "welcome worker stopped; dropping email");
                false
            }
        }
    }
}

impl fmt::Debug for WelcomeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WelcomeNotifier")
            .field("capacity", &self.sender.max_capacity())
            .finish()
    }
}
