//! # Notification Channels
//!
//! Delivers the daily summary message to the one configured recipient.
//!
//! ## Channels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Summary Delivery                                │
//! │                                                                         │
//! │  SummaryScheduler ── message ──► SummaryChannel                         │
//! │                                       │                                 │
//! │                  ┌────────────────────┴─────────────────────┐           │
//! │                  ▼                                          ▼           │
//! │        WhatsAppLinkNotifier                          WebhookNotifier    │
//! │        ────────────────────                          ───────────────    │
//! │        api.whatsapp.com/send?phone=..&text=..        POST {recipient,   │
//! │        logged at info                                      message}     │
//! │                                                      retry 5xx with     │
//! │                                                      exponential backoff│
//! │                                                      4xx: give up       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{NotifyChannel, NotifySettings};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The channel did not answer in time.
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-success status.
    ///
    /// ## When This Occurs
    /// - Webhook returns 4xx (permanent, not retried)
    /// - Webhook keeps returning 5xx until retries run out
    #[error("Notification rejected with status {status}")]
    Rejected { status: u16 },

    /// Network-level failure (DNS, refused connection, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The channel could not be set up from its settings.
    #[error("Invalid notifier settings: {0}")]
    Build(String),
}

impl NotifyError {
    /// Errors that retrying cannot fix.
    pub fn is_permanent(&self) -> bool {
        match self {
            NotifyError::Rejected { status } => (400..500).contains(status) && *status != 429,
            NotifyError::Build(_) => true,
            NotifyError::Timeout(_) | NotifyError::Transport(_) => false,
        }
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;

// =============================================================================
// Notifier Trait
// =============================================================================

/// Something that can take a message to the summary recipient.
pub trait Notifier: Send + Sync + 'static {
    fn send(&self, message: &str) -> impl Future<Output = NotifyResult<()>> + Send;
}

// =============================================================================
// WhatsApp Link
// =============================================================================

/// Builds a click-to-chat link for the recipient and publishes it to the log.
#[derive(Debug, Clone)]
pub struct WhatsAppLinkNotifier {
    base: Url,
    recipient: String,
}

impl WhatsAppLinkNotifier {
    pub fn new(link_base: &str, recipient: impl Into<String>) -> NotifyResult<Self> {
        let base = Url::parse(link_base)
            .map_err(|e| NotifyError::Build(format!("link_base '{}': {}", link_base, e)))?;

        Ok(WhatsAppLinkNotifier {
            base,
            recipient: recipient.into(),
        })
    }

    /// `{base}?phone={recipient}&text={message}`, form-encoded.
    pub fn link_for(&self, message: &str) -> Url {
        let mut link = self.base.clone();
        link.query_pairs_mut()
            .append_pair("phone", &self.recipient)
            .append_pair("text", message);
        link
    }
}

impl Notifier for WhatsAppLinkNotifier {
    async fn send(&self, message: &str) -> NotifyResult<()> {
        let link = self.link_for(message);
        info!(recipient = %self.recipient, %link, "Daily summary ready");
        Ok(())
    }
}

// =============================================================================
// Webhook
// =============================================================================

#[derive(Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    message: &'a str,
}

/// POSTs the message as JSON, retrying transient failures.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
    recipient: String,
    timeout: Duration,
    max_retry: Duration,
    initial_backoff: Duration,
}

impl WebhookNotifier {
    pub fn new(
        url: &str,
        recipient: impl Into<String>,
        timeout: Duration,
        max_retry: Duration,
    ) -> NotifyResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| NotifyError::Build(format!("webhook_url '{}': {}", url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        Ok(WebhookNotifier {
            client,
            url,
            recipient: recipient.into(),
            timeout,
            max_retry,
            initial_backoff: Duration::from_millis(500),
        })
    }

    /// Overrides the first retry delay.
    pub fn with_initial_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    async fn post_once(&self, message: &str) -> NotifyResult<()> {
        let payload = WebhookPayload {
            recipient: &self.recipient,
            message,
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout(self.timeout)
                } else {
                    NotifyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "Webhook accepted summary");
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_retry.max(self.initial_backoff),
            multiplier: 2.0,
            max_elapsed_time: Some(self.max_retry),
            ..Default::default()
        }
    }
}

impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> NotifyResult<()> {
        let mut backoff = self.create_backoff();
        let mut attempt = 1u32;

        loop {
            let err = match self.post_once(message).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_permanent() => return Err(e),
                Err(e) => e,
            };

            let Some(delay) = backoff.next_backoff() else {
                return Err(err);
            };

            warn!(attempt, error = %err, ?delay, "Webhook delivery failed, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// =============================================================================
// Configured Channel
// =============================================================================

/// The channel selected by `notify.channel`.
#[derive(Debug, Clone)]
pub enum SummaryChannel {
    WhatsappLink(WhatsAppLinkNotifier),
    Webhook(WebhookNotifier),
}

impl SummaryChannel {
    pub fn from_settings(settings: &NotifySettings) -> NotifyResult<Self> {
        match settings.channel {
            NotifyChannel::WhatsappLink => Ok(SummaryChannel::WhatsappLink(
                WhatsAppLinkNotifier::new(&settings.link_base, settings.recipient.trim())?,
            )),
            NotifyChannel::Webhook => Ok(SummaryChannel::Webhook(WebhookNotifier::new(
                &settings.webhook_url,
                settings.recipient.trim(),
                settings.timeout(),
                settings.max_retry(),
            )?)),
        }
    }
}

impl Notifier for SummaryChannel {
    async fn send(&self, message: &str) -> NotifyResult<()> {
        match self {
            SummaryChannel::WhatsappLink(n) => n.send(message).await,
            SummaryChannel::Webhook(n) => n.send(message).await,
        }
    }
}
