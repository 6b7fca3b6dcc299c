//! Custody-change notifications.
//!
//! After a transition commits, the dispatcher loads the recipient list,
//! formats one message from the event captured at commit time, and sends it
//! to every recipient in parallel. Each delivery stands alone: failures are
//! logged and dropped, with no retries and no ordering between recipients.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::custody::{CustodyAction, CustodyEvent};
use super::ports::{CustodyNotifier, RecipientDirectory, SmsGateway};
use super::trace_id::TraceId;

/// Timestamp layout used in message text (24-hour clock).
pub const MESSAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A phone number registered for custody notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Directory row id.
    pub id: i64,
    /// Phone number messages are sent to.
    pub phone: String,
}

/// Language of the outgoing message text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLocale {
    /// English phrasing.
    #[default]
    En,
    /// Russian phrasing.
    Ru,
}

/// A locale string other than `en` or `ru`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported message locale: {0}")]
pub struct UnknownLocaleError(pub String);

impl FromStr for MessageLocale {
    type Err = UnknownLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ru" => Ok(Self::Ru),
            other => Err(UnknownLocaleError(other.to_owned())),
        }
    }
}

impl fmt::Display for MessageLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::En => "en",
            Self::Ru => "ru",
        })
    }
}

/// How events are rendered into message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFormat {
    /// Phrasing language.
    pub locale: MessageLocale,
    /// Offset applied to the commit timestamp.
    pub offset: FixedOffset,
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self {
            locale: MessageLocale::En,
            offset: Utc.fix(),
        }
    }
}

impl MessageFormat {
    /// Render the message text for `event`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use keyledger::domain::{CustodyAction, CustodyEvent, KeyId, MessageFormat};
    ///
    /// let event = CustodyEvent {
    ///     actor_name: "Admin User".into(),
    ///     key_id: KeyId::parse("K001").expect("key id"),
    ///     key_name: "North mast".into(),
    ///     action: CustodyAction::Take,
    ///     at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 5, 9).unwrap(),
    /// };
    /// assert_eq!(
    ///     MessageFormat::default().render(&event),
    ///     "Admin User TOOK keys for K001_North mast at 2026-03-01 08:05:09"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self, event: &CustodyEvent) -> String {
        let at = event
            .at
            .with_timezone(&self.offset)
            .format(MESSAGE_TIMESTAMP_FORMAT);
        let name = &event.actor_name;
        let key = format!("{}_{}", event.key_id, event.key_name);
        match (self.locale, event.action) {
            (MessageLocale::En, CustodyAction::Take) => format!("{name} TOOK keys for {key} at {at}"),
            (MessageLocale::En, CustodyAction::Return) => {
                format!("{name} RETURNED keys for {key} at {at}")
            }
            (MessageLocale::Ru, CustodyAction::Take) => format!("{name} ВЗЯЛ ключи от {key} в {at}"),
            (MessageLocale::Ru, CustodyAction::Return) => format!("{name} СДАЛ ключи от {key} в {at}"),
        }
    }
}

/// Counts from one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Deliveries started.
    pub attempted: usize,
    /// Deliveries the gateway accepted.
    pub delivered: usize,
}

/// Fans committed custody events out to every registered recipient.
#[derive(Clone)]
pub struct NotificationDispatcher {
    directory: Arc<dyn RecipientDirectory>,
    gateway: Arc<dyn SmsGateway>,
    format: MessageFormat,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the given directory and gateway.
    pub fn new(
        directory: Arc<dyn RecipientDirectory>,
        gateway: Arc<dyn SmsGateway>,
        format: MessageFormat,
    ) -> Self {
        Self {
            directory,
            gateway,
            format,
        }
    }

    /// Deliver `event` to all recipients and wait for every attempt.
    ///
    /// Never fails: a directory error aborts the fan-out with a warning and
    /// individual delivery errors are logged per recipient.
    pub async fn dispatch(&self, event: &CustodyEvent) -> DispatchReport {
        let recipients = match self.directory.list_recipients().await {
            Ok(recipients) => recipients,
            Err(error) => {
                warn!(key_id = %event.key_id, error = %error, "could not load notification recipients");
                return DispatchReport::default();
            }
        };
        let text = self.format.render(event);
        let gateway = &self.gateway;
        let text = text.as_str();
        let deliveries = recipients.iter().map(|recipient| async move {
            match gateway.send(&recipient.phone, text).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(recipient = %recipient.phone, error = %error, "notification delivery failed");
                    false
                }
            }
        });
        let outcomes = join_all(deliveries).await;
        let report = DispatchReport {
            attempted: outcomes.len(),
            delivered: outcomes.into_iter().filter(|delivered| *delivered).count(),
        };
        info!(
            key_id = %event.key_id,
            attempted = report.attempted,
            delivered = report.delivered,
            "custody notification dispatched"
        );
        report
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl CustodyNotifier for NotificationDispatcher {
    fn notify(&self, event: CustodyEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(key_id = %event.key_id, "no async runtime; custody notification skipped");
            return;
        };
        let dispatcher = self.clone();
        let trace_id = TraceId::current();
        debug!(key_id = %event.key_id, "scheduling custody notification");
        runtime.spawn(TraceId::instrument(trace_id, async move {
            dispatcher.dispatch(&event).await;
        }));
    }
}
